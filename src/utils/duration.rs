//! Duration parsing utilities.
//!
//! This module provides utilities for parsing duration strings
//! (e.g., "90s", "30m") into seconds.

/// Parse duration string (e.g., "2h", "30m", "90s") to seconds
///
/// Supports raw seconds ("90") and the unit suffixes s/sec/secs/second/
/// seconds, m/min/mins/minute/minutes, h/hr/hrs/hour/hours.
///
/// # Examples
/// ```
/// use fabricsim::utils::duration::parse_duration_to_seconds;
///
/// assert_eq!(parse_duration_to_seconds("90"), Ok(90));
/// assert_eq!(parse_duration_to_seconds("30m"), Ok(1800));
/// assert_eq!(parse_duration_to_seconds("2h"), Ok(7200));
/// assert!(parse_duration_to_seconds("soon").is_err());
/// ```
pub fn parse_duration_to_seconds(duration: &str) -> Result<u64, String> {
    let duration = duration.trim();

    // Longer suffixes are listed first so "mins" is not read as "s".
    const UNITS: &[(&str, u64)] = &[
        ("seconds", 1),
        ("second", 1),
        ("secs", 1),
        ("sec", 1),
        ("minutes", 60),
        ("minute", 60),
        ("mins", 60),
        ("min", 60),
        ("hours", 3600),
        ("hour", 3600),
        ("hrs", 3600),
        ("hr", 3600),
        ("s", 1),
        ("m", 60),
        ("h", 3600),
    ];

    for (suffix, factor) in UNITS {
        if let Some(num_str) = duration.strip_suffix(suffix) {
            if let Ok(value) = num_str.trim().parse::<u64>() {
                return Ok(value * factor);
            }
        }
    }

    // No unit suffix: raw seconds.
    if let Ok(seconds) = duration.parse::<u64>() {
        return Ok(seconds);
    }

    Err(format!("Invalid duration format: {}", duration))
}
