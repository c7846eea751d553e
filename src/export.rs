//! Report export for `asa_log_analyzer`
//!
//! Text output is the component output as-is. JSON output collects the
//! results and writes one pretty-printed document. A report bound for a file
//! is rendered in memory and only written once it is complete.

use std::io::{self, Write};
use std::path::Path;

use clap::ValueEnum;
use serde::Serialize;
use tracing::info;

use crate::deny_rate::ConnectionTally;

/// Error type for `export` operations.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonSerialize(#[from] serde_json::Error),
}

/// Supported export formats
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    /// Plain lines, as printed on the console
    #[default]
    Text,
    /// A single JSON document
    Json,
}

/// Criterion a [`MatchReport`] was produced with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchFilter {
    /// Severity level 0-7
    Severity(u8),
    /// Literal search text
    Pattern(String),
}

/// Lines selected by the severity filter or the message search.
#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    /// RFC 3339 UTC timestamp
    pub generated_at: String,
    /// Log file path
    pub log: String,
    /// Selection criterion
    pub filter: MatchFilter,
    /// Number of lines
    pub count: usize,
    /// Matching lines, trimmed
    pub lines: Vec<String>,
}

impl MatchReport {
    /// Builds a report stamped with the current time.
    pub fn new(log: &Path, filter: MatchFilter, lines: Vec<String>) -> Self {
        Self {
            generated_at: timestamp(),
            log: log.display().to_string(),
            filter,
            count: lines.len(),
            lines,
        }
    }
}

/// Connection counts and deny rate.
#[derive(Debug, Clone, Serialize)]
pub struct DenyRateReport {
    /// RFC 3339 UTC timestamp
    pub generated_at: String,
    /// Log file path
    pub log: String,
    /// Permitted plus denied connections
    pub total: u64,
    /// Permitted connections
    pub permitted: u64,
    /// Denied connections
    pub denied: u64,
    /// Denied share in percent, two decimals; `None` with no connections
    pub deny_percentage: Option<f64>,
}

impl DenyRateReport {
    /// Builds a report stamped with the current time.
    pub fn new(log: &Path, tally: &ConnectionTally) -> Self {
        Self {
            generated_at: timestamp(),
            log: log.display().to_string(),
            total: tally.total(),
            permitted: tally.permitted(),
            denied: tally.denied(),
            // Same digits as the text summary's `{:.2}`.
            deny_percentage: tally
                .deny_percentage()
                .and_then(|p| format!("{p:.2}").parse().ok()),
        }
    }
}

fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

/// Serializes `report` as pretty JSON and writes it, followed by a newline.
///
/// # Errors
/// Returns an error if serialization or writing fails.
pub fn write_json<T: Serialize, W: Write + ?Sized>(report: &T, out: &mut W) -> Result<String, ExportError> {
    let json = serde_json::to_string_pretty(report)?;
    writeln!(out, "{json}")?;
    Ok(json)
}

/// Writes a fully rendered report to `path`, replacing its previous content.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn write_report(path: &Path, report: &[u8]) -> Result<(), ExportError> {
    std::fs::write(path, report)?;
    info!("Export successful to {}", path.display());
    Ok(())
}
