//! Literal substring search over log lines.

use std::io::Write;

use tracing::info;

use crate::error::Result;
use crate::log_file::LogFile;

/// Whether `pattern` occurs in `line`. Case-sensitive; the empty pattern
/// matches every line.
pub fn matches_pattern(line: &str, pattern: &str) -> bool {
    line.contains(pattern)
}

fn scan_matching<F>(log: &LogFile, pattern: &str, mut on_match: F) -> Result<usize>
where
    F: FnMut(&str) -> Result<()>,
{
    let mut count = 0;
    for line in log.lines()? {
        let line = line?;
        if matches_pattern(&line, pattern) {
            on_match(line.trim())?;
            count += 1;
        }
    }
    info!(
        "Found {} line(s) containing '{}' in {}",
        count,
        pattern,
        log.path().display()
    );
    Ok(count)
}

/// Returns the trimmed lines of `log` containing `pattern`.
///
/// # Errors
/// Returns a [`crate::ScanError`] if the file cannot be read.
pub fn collect_matching(log: &LogFile, pattern: &str) -> Result<Vec<String>> {
    let mut matches = Vec::new();
    scan_matching(log, pattern, |line| {
        matches.push(line.to_string());
        Ok(())
    })?;
    Ok(matches)
}

/// Prints the trimmed lines of `log` containing `pattern`.
///
/// Returns the number of lines printed.
///
/// # Errors
/// Returns a [`crate::ScanError`] if the file cannot be read or the output
/// cannot be written.
pub fn display_matching<W: Write + ?Sized>(
    log: &LogFile,
    pattern: &str,
    out: &mut W,
) -> Result<usize> {
    scan_matching(log, pattern, |line| Ok(writeln!(out, "{line}")?))
}
