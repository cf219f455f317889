//! Shared utilities: duration parsing.

pub mod duration;

pub use duration::parse_duration_to_seconds;
