//! Throughput-record conversion.
//!
//! This file converts the per-stream JSON records written by the
//! throughput tester into flat CSV files, one row per stream interval.

use log::info;
use serde_json::Value;
use std::fs;
use std::path::Path;

const CSV_HEADER: &str =
    "start,end,seconds,bytes,bits_per_second,retransmits,rtt,rttvar,snd_cwnd,pmtu";

/// Fields extracted from every interval stream, in column order.
const STREAM_FIELDS: [&str; 10] = [
    "start",
    "end",
    "seconds",
    "bytes",
    "bits_per_second",
    "retransmits",
    "rtt",
    "rttvar",
    "snd_cwnd",
    "pmtu",
];

/// Errors raised during record conversion.
#[derive(Debug, thiserror::Error)]
pub enum ResultsError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to write '{path}': {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
    #[error("'{path}' is not a valid throughput record: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("'{path}' contains no interval data")]
    NoIntervals { path: String },
}

/// Convert one JSON throughput record into a CSV file.
///
/// Returns the number of data rows written.
pub fn convert_record_to_csv(json_path: &Path, csv_path: &Path) -> Result<usize, ResultsError> {
    let content = fs::read_to_string(json_path).map_err(|source| ResultsError::Read {
        path: json_path.display().to_string(),
        source,
    })?;
    let record: Value = serde_json::from_str(&content).map_err(|source| ResultsError::Parse {
        path: json_path.display().to_string(),
        source,
    })?;

    let intervals = record
        .get("intervals")
        .and_then(Value::as_array)
        .filter(|a| !a.is_empty())
        .ok_or_else(|| ResultsError::NoIntervals {
            path: json_path.display().to_string(),
        })?;

    let mut csv = String::from(CSV_HEADER);
    csv.push('\n');
    let mut rows = 0;
    for interval in intervals {
        let streams = interval
            .get("streams")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        for stream in &streams {
            let row: Vec<String> = STREAM_FIELDS
                .iter()
                .map(|field| cell(stream.get(*field)))
                .collect();
            csv.push_str(&row.join(","));
            csv.push('\n');
            rows += 1;
        }
    }

    fs::write(csv_path, csv).map_err(|source| ResultsError::Write {
        path: csv_path.display().to_string(),
        source,
    })?;
    info!(
        "Converted {} rows from {} to {}",
        rows,
        json_path.display(),
        csv_path.display()
    );
    Ok(rows)
}

fn cell(value: Option<&Value>) -> String {
    match value {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}
