#![crate_type = "lib"]
#![forbid(unsafe_code)]
#![forbid(missing_debug_implementations)]
#![forbid(missing_docs)]
#![doc = include_str!("../README.md")]

//! # asa_log_analyzer
//!
//! A Cisco ASA firewall log viewer and library.
//!
//! - Page through a log with an injectable pause between pages
//! - Filter messages by their `%ASA-<level>-` severity
//! - Search for a literal message
//! - Compute the share of denied connections
//!
//! ## Example (library)
//! ```no_run
//! use asa_log_analyzer::{display_by_severity, LogFile, Severity};
//!
//! let log = LogFile::new("asa.log");
//! let mut out = std::io::stdout();
//! display_by_severity(&log, Severity::Warnings, &mut out)?;
//! # Ok::<(), asa_log_analyzer::ScanError>(())
//! ```

mod app;
mod deny_rate;
mod error;
mod export;
mod loader;
mod log_file;
mod paginator;
mod search;
mod severity;

pub use app::{run_analyzer, AnalyzerError, Args, Command, ExportArgs};
pub use deny_rate::{
    calculate_deny_rate, classify, tally_connections, ConnectionTally, Verdict, DENY_TOKEN,
    PERMITTED_TOKEN,
};
pub use error::{Result, ScanError};
pub use export::{
    write_json, write_report, DenyRateReport, ExportError, ExportFormat, MatchFilter,
    MatchReport,
};
pub use loader::{load_profile, load_profile_json, load_profile_yaml, LoaderError, Profile};
pub use log_file::{Decoding, LogFile, LogFileError, LogLines};
pub use paginator::{
    display_paged, write_page, NoPause, Page, PageAdvance, Paginator, StdinPrompt,
    CONTINUE_PROMPT,
};
pub use search::{collect_matching, display_matching, matches_pattern};
pub use severity::{
    collect_by_severity, display_by_severity, parse_severity, severity_of, Severity,
};
