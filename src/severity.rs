//! Severity extraction and filtering for Cisco ASA log lines.
//!
//! ASA messages carry their severity in a `%ASA-<level>-<id>` marker, where
//! `<level>` is a single digit from 0 (emergencies) to 7 (debugging).

use std::io::Write;
use std::sync::OnceLock;

use regex::Regex;
use strum_macros::{AsRefStr, EnumIter, EnumString};
use tracing::info;

use crate::error::Result;
use crate::log_file::LogFile;

/// Severity level of an ASA message.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[repr(u8)]
pub enum Severity {
    /// 0, system unusable
    Emergencies = 0,
    /// 1, immediate action needed
    Alerts = 1,
    /// 2, critical condition
    Critical = 2,
    /// 3, error condition
    Errors = 3,
    /// 4, warning condition
    Warnings = 4,
    /// 5, normal but significant condition
    Notifications = 5,
    /// 6, informational message
    Informational = 6,
    /// 7, debugging message
    Debugging = 7,
}

impl Severity {
    /// Numeric level, 0 to 7.
    pub fn level(self) -> u8 {
        self as u8
    }
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> Self {
        severity.level()
    }
}

impl TryFrom<u8> for Severity {
    type Error = u8;

    fn try_from(level: u8) -> std::result::Result<Self, Self::Error> {
        Ok(match level {
            0 => Self::Emergencies,
            1 => Self::Alerts,
            2 => Self::Critical,
            3 => Self::Errors,
            4 => Self::Warnings,
            5 => Self::Notifications,
            6 => Self::Informational,
            7 => Self::Debugging,
            other => return Err(other),
        })
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.level(), self.as_ref())
    }
}

/// Parses a severity given as a digit (`"4"`) or a level name (`"warnings"`).
///
/// # Errors
/// Returns a message naming the accepted values when `input` is neither.
pub fn parse_severity(input: &str) -> std::result::Result<Severity, String> {
    let input = input.trim();
    if let Ok(level) = input.parse::<u8>() {
        return Severity::try_from(level)
            .map_err(|level| format!("severity level {level} is out of range (0-7)"));
    }
    input.parse::<Severity>().map_err(|_| {
        format!(
            "unknown severity '{input}', expected 0-7 or one of: emergencies, alerts, \
             critical, errors, warnings, notifications, informational, debugging"
        )
    })
}

fn marker_regex() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"%ASA-([0-9])-").expect("severity marker pattern is valid"))
}

/// Extracts the severity from the first `%ASA-<digit>-` marker of `line`.
///
/// Returns `None` when there is no marker or its digit is 8 or 9.
pub fn severity_of(line: &str) -> Option<Severity> {
    let caps = marker_regex().captures(line)?;
    let digit = caps.get(1)?.as_str().parse::<u8>().ok()?;
    Severity::try_from(digit).ok()
}

/// Runs `on_match` on each trimmed line of `log` whose severity equals `level`
/// and returns how many there were.
fn scan_severity<F>(log: &LogFile, level: Severity, mut on_match: F) -> Result<usize>
where
    F: FnMut(&str) -> Result<()>,
{
    let mut count = 0;
    for line in log.lines()? {
        let line = line?;
        if severity_of(&line) == Some(level) {
            on_match(line.trim())?;
            count += 1;
        }
    }
    info!(
        "Found {} message(s) with severity {} in {}",
        count,
        level,
        log.path().display()
    );
    Ok(count)
}

/// Returns the trimmed lines of `log` whose severity equals `level`.
///
/// # Errors
/// Returns a [`crate::ScanError`] if the file cannot be read.
pub fn collect_by_severity(log: &LogFile, level: Severity) -> Result<Vec<String>> {
    let mut matches = Vec::new();
    scan_severity(log, level, |line| {
        matches.push(line.to_string());
        Ok(())
    })?;
    Ok(matches)
}

/// Prints the trimmed lines of `log` whose severity equals `level`.
///
/// Returns the number of lines printed.
///
/// # Errors
/// Returns a [`crate::ScanError`] if the file cannot be read or the output
/// cannot be written.
pub fn display_by_severity<W: Write + ?Sized>(
    log: &LogFile,
    level: Severity,
    out: &mut W,
) -> Result<usize> {
    scan_severity(log, level, |line| Ok(writeln!(out, "{line}")?))
}
