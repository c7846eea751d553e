//! Log file access for `asa_log_analyzer`
//!
//! Opens a log file, decodes each line according to a [`Decoding`] policy and
//! yields the lines without their terminators. Lines are split on `\n`, `\r\n`
//! and lone `\r`.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;


/// Error type for `log_file` operations.
#[derive(Debug, thiserror::Error)]
pub enum LogFileError {
    /// The file could not be opened
    #[error("cannot open {}: {source}", path.display())]
    Open {
        /// File path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
    /// The file could not be read after opening
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// File path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
    /// Strict decoding hit an invalid UTF-8 sequence
    #[error("invalid UTF-8 in {} at line {line}", path.display())]
    InvalidUtf8 {
        /// File path
        path: PathBuf,
        /// 1-based physical line number
        line: usize,
    },
}

/// How invalid UTF-8 byte sequences are handled while reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decoding {
    /// Drop invalid sequences silently
    #[default]
    Skip,
    /// Substitute U+FFFD for each invalid sequence
    Replace,
    /// Fail on the first invalid sequence
    Strict,
}

/// A log file on disk together with the policy used to decode it.
///
/// Nothing is opened until [`LogFile::lines`] or [`LogFile::read_lines`] is
/// called; each call opens its own handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    path: PathBuf,
    decoding: Decoding,
}

impl LogFile {
    /// Creates a log file reference using the default [`Decoding::Skip`] policy.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            decoding: Decoding::default(),
        }
    }

    /// Returns a copy with another decoding policy.
    #[must_use]
    pub fn with_decoding(mut self, decoding: Decoding) -> Self {
        self.decoding = decoding;
        self
    }

    /// Path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decoding policy in use.
    pub fn decoding(&self) -> Decoding {
        self.decoding
    }

    /// Opens the file and streams its lines.
    ///
    /// # Errors
    /// Returns [`LogFileError::Open`] if the file cannot be opened.
    pub fn lines(&self) -> Result<LogLines, LogFileError> {
        let file = File::open(&self.path).map_err(|source| LogFileError::Open {
            path: self.path.clone(),
            source,
        })?;
        Ok(LogLines {
            reader: BufReader::new(file),
            path: self.path.clone(),
            decoding: self.decoding,
            pending: VecDeque::new(),
            physical_line: 0,
            dropped_bytes: 0,
            done: false,
        })
    }

    /// Reads every line of the file into memory.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or read, or if strict
    /// decoding fails.
    pub fn read_lines(&self) -> Result<Vec<String>, LogFileError> {
        self.lines()?.collect()
    }
}

/// Streaming line iterator over an open log file.
///
/// The underlying handle is closed when the iterator is dropped.
#[derive(Debug)]
pub struct LogLines {
    reader: BufReader<File>,
    path: PathBuf,
    decoding: Decoding,
    pending: VecDeque<String>,
    physical_line: usize,
    dropped_bytes: usize,
    done: bool,
}

impl LogLines {
    /// Number of bytes dropped so far under [`Decoding::Skip`].
    pub fn dropped_bytes(&self) -> usize {
        self.dropped_bytes
    }

    fn fill(&mut self) -> Result<(), LogFileError> {
        let mut buf = Vec::new();
        let read = self
            .reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| LogFileError::Read {
                path: self.path.clone(),
                source,
            })?;
        if read == 0 {
            self.done = true;
            debug!(
                "Finished reading {} ({} line(s), {} byte(s) dropped)",
                self.path.display(),
                self.physical_line,
                self.dropped_bytes
            );
            return Ok(());
        }
        self.physical_line += 1;

        let text = match self.decoding {
            Decoding::Skip => {
                let (text, dropped) = decode_skipping(&buf);
                self.dropped_bytes += dropped;
                text
            }
            Decoding::Replace => String::from_utf8_lossy(&buf).into_owned(),
            Decoding::Strict => {
                String::from_utf8(buf).map_err(|_| LogFileError::InvalidUtf8 {
                    path: self.path.clone(),
                    line: self.physical_line,
                })?
            }
        };
        self.pending.extend(split_terminators(&text));
        Ok(())
    }
}

impl Iterator for LogLines {
    type Item = Result<String, LogFileError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(line) = self.pending.pop_front() {
                return Some(Ok(line));
            }
            if self.done {
                return None;
            }
            if let Err(e) = self.fill() {
                self.done = true;
                return Some(Err(e));
            }
        }
    }
}

/// Decodes `bytes` as UTF-8, dropping every invalid sequence.
///
/// Returns the decoded text and the number of bytes dropped.
pub(crate) fn decode_skipping(mut bytes: &[u8]) -> (String, usize) {
    let mut text = String::with_capacity(bytes.len());
    let mut dropped = 0;
    loop {
        match std::str::from_utf8(bytes) {
            Ok(valid) => {
                text.push_str(valid);
                return (text, dropped);
            }
            Err(e) => {
                let (valid, rest) = bytes.split_at(e.valid_up_to());
                text.push_str(std::str::from_utf8(valid).unwrap_or_default());
                // A truncated sequence at the end has no error length.
                let skip = e.error_len().unwrap_or(rest.len());
                dropped += skip;
                bytes = &rest[skip..];
            }
        }
    }
}

/// Splits one `\n`-terminated chunk into logical lines, treating lone `\r`
/// as a terminator too.
pub(crate) fn split_terminators(chunk: &str) -> Vec<String> {
    let body = chunk.strip_suffix('\n').unwrap_or(chunk);
    let body = body.strip_suffix('\r').unwrap_or(body);
    body.split('\r').map(str::to_string).collect()
}
