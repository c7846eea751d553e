//! Denied versus permitted connection ratio.

use std::fmt;
use std::io::Write;

use tracing::info;

use crate::error::Result;
use crate::log_file::LogFile;

/// Token marking a permitted connection.
pub const PERMITTED_TOKEN: &str = "permitted";
/// Token marking a denied connection.
pub const DENY_TOKEN: &str = "Deny";

/// How a single line counts towards the tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The line contains `permitted`
    Permitted,
    /// The line contains `Deny` and not `permitted`
    Denied,
}

/// Classifies a line. `permitted` wins when both tokens are present.
pub fn classify(line: &str) -> Option<Verdict> {
    if line.contains(PERMITTED_TOKEN) {
        Some(Verdict::Permitted)
    } else if line.contains(DENY_TOKEN) {
        Some(Verdict::Denied)
    } else {
        None
    }
}

/// Connection counters accumulated over one pass of a log file.
///
/// `denied <= total` holds for every value reachable through [`observe`].
///
/// [`observe`]: ConnectionTally::observe
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionTally {
    total: u64,
    denied: u64,
}

impl ConnectionTally {
    /// Counts one line.
    pub fn observe(&mut self, line: &str) {
        match classify(line) {
            Some(Verdict::Permitted) => self.total += 1,
            Some(Verdict::Denied) => {
                self.denied += 1;
                self.total += 1;
            }
            None => {}
        }
    }

    /// Builds a tally from lines.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tally = Self::default();
        for line in lines {
            tally.observe(line.as_ref());
        }
        tally
    }

    /// Permitted plus denied connections.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Denied connections.
    pub fn denied(&self) -> u64 {
        self.denied
    }

    /// Permitted connections.
    pub fn permitted(&self) -> u64 {
        self.total - self.denied
    }

    /// Percentage of denied connections, or `None` when nothing was counted.
    pub fn deny_percentage(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some(self.denied as f64 / self.total as f64 * 100.0)
    }
}

impl fmt::Display for ConnectionTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.deny_percentage() {
            None => write!(f, "No connections detected."),
            Some(pct) => {
                writeln!(f, "Total connections (permitted + Deny): {}", self.total)?;
                writeln!(f, "Denied connections (Deny): {}", self.denied)?;
                write!(f, "Denied connection rate: {pct:.2}%")
            }
        }
    }
}

/// Counts permitted and denied connections in `log`.
///
/// # Errors
/// Returns a [`crate::ScanError`] if the file cannot be read.
pub fn tally_connections(log: &LogFile) -> Result<ConnectionTally> {
    let mut tally = ConnectionTally::default();
    for line in log.lines()? {
        tally.observe(&line?);
    }
    info!(
        "Counted {} connection(s), {} denied, in {}",
        tally.total(),
        tally.denied(),
        log.path().display()
    );
    Ok(tally)
}

/// Counts connections in `log` and prints the summary.
///
/// # Errors
/// Returns a [`crate::ScanError`] if the file cannot be read or the output
/// cannot be written.
pub fn calculate_deny_rate<W: Write + ?Sized>(
    log: &LogFile,
    out: &mut W,
) -> Result<ConnectionTally> {
    let tally = tally_connections(log)?;
    writeln!(out, "{tally}")?;
    Ok(tally)
}
