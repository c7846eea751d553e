use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::info;

use crate::deny_rate::{calculate_deny_rate, tally_connections};
use crate::error::ScanError;
use crate::export::{
    write_json, write_report, DenyRateReport, ExportError, ExportFormat, MatchFilter,
    MatchReport,
};
use crate::loader::{load_profile, LoaderError, Profile};
use crate::log_file::{Decoding, LogFile};
use crate::paginator::{display_paged, NoPause, PageAdvance, StdinPrompt};
use crate::search::{collect_matching, display_matching};
use crate::severity::{collect_by_severity, display_by_severity, parse_severity, Severity};

/// Error type for `asa_log_analyzer` operations.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    /// Scanning error
    #[error(transparent)]
    Scan(#[from] ScanError),
    /// Loader error
    #[error("Loader error: {0}")]
    LoaderError(#[from] LoaderError),
    /// Export error
    #[error("Export error: {0}")]
    ExportError(#[from] ExportError),
    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// ASA log analyzer CLI arguments
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Cisco ASA firewall log viewer (paging, severity filter, search, deny rate)",
    long_about = "This program reads a Cisco ASA firewall log and shows it page by page, \
                  filters it by severity, searches it for a literal message, or computes \
                  the share of denied connections."
)]
pub struct Args {
    /// Path to an analysis profile (YAML or JSON) providing defaults
    #[arg(long, short = 'p', global = true)]
    pub profile: Option<PathBuf>,

    /// Path to the log file (overrides the profile's log_path)
    #[arg(long, short = 'l', global = true)]
    pub log: Option<PathBuf>,

    /// Handling of invalid UTF-8 in the log (overrides the profile)
    #[arg(long, value_enum, global = true)]
    pub decoding: Option<Decoding>,

    /// Log debug details to stderr
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors to stderr
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Operation to run
    #[command(subcommand)]
    pub command: Command,
}

/// Operations over the log file
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the log page by page
    Page {
        /// Lines per page
        #[arg(long, short = 's')]
        page_size: Option<usize>,

        /// Do not wait for Enter between pages
        #[arg(long)]
        no_pause: bool,
    },
    /// Show messages of one severity level
    Severity {
        /// Level 0-7 or name (emergencies ... debugging)
        #[arg(long, short = 's', value_parser = parse_severity)]
        level: Option<Severity>,

        /// Output format and destination
        #[command(flatten)]
        export: ExportArgs,
    },
    /// Show lines containing a literal text
    Search {
        /// Text to look for (case-sensitive)
        #[arg(long, short = 'm')]
        pattern: Option<String>,

        /// Output format and destination
        #[command(flatten)]
        export: ExportArgs,
    },
    /// Compute the share of denied connections
    DenyRate {
        /// Output format and destination
        #[command(flatten)]
        export: ExportArgs,
    },
    /// Run all four analyses in order
    All {
        /// Do not wait for Enter between pages
        #[arg(long)]
        no_pause: bool,
    },
}

/// Output options shared by the reporting commands
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct ExportArgs {
    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "text")]
    pub format: ExportFormat,

    /// Write the report to this file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Runs the operation selected by `args`.
///
/// Steps performed:
/// 1. Load the analysis profile (or the defaults) and apply command-line overrides.
/// 2. Resolve the log file, which must come from `--log` or the profile.
/// 3. Run the selected operation and write its output.
///
/// # Errors
/// Returns `AnalyzerError` variants if:
/// * The profile cannot be loaded or is invalid.
/// * No log file was given, or a parameter is out of range.
/// * The log file cannot be opened, read or decoded, or the output cannot be written.
pub fn run_analyzer(args: Args) -> Result<(), AnalyzerError> {
    let profile = load_profile(args.profile.as_deref())?;

    let path = args
        .log
        .or_else(|| profile.log_path.clone())
        .ok_or_else(|| {
            AnalyzerError::ValidationError(
                "No log file given (use --log or set log_path in the profile).".into(),
            )
        })?;
    let log = LogFile::new(path).with_decoding(args.decoding.unwrap_or(profile.decoding));
    info!(
        "Analyzing {} ({:?} decoding)",
        log.path().display(),
        log.decoding()
    );

    match args.command {
        Command::Page {
            page_size,
            no_pause,
        } => {
            let page_size = page_size.unwrap_or(profile.page_size);
            run_page(&log, page_size, no_pause)
        }
        Command::Severity { level, export } => {
            let level = resolve_severity(level, &profile)?;
            run_severity(&log, level, &export)
        }
        Command::Search { pattern, export } => {
            let pattern = pattern.unwrap_or_else(|| profile.search_pattern.clone());
            run_search(&log, &pattern, &export)
        }
        Command::DenyRate { export } => run_deny_rate(&log, &export),
        Command::All { no_pause } => run_all(&log, &profile, no_pause),
    }
}

fn resolve_severity(level: Option<Severity>, profile: &Profile) -> Result<Severity, AnalyzerError> {
    match level {
        Some(level) => Ok(level),
        None => profile.severity_level().map_err(|level| {
            AnalyzerError::ValidationError(format!("severity {level} is out of range (0-7)"))
        }),
    }
}

fn page_advance(no_pause: bool) -> Box<dyn PageAdvance> {
    if no_pause {
        Box::new(NoPause)
    } else {
        Box::new(StdinPrompt)
    }
}

fn run_page(log: &LogFile, page_size: usize, no_pause: bool) -> Result<(), AnalyzerError> {
    let mut advance = page_advance(no_pause);
    let mut out = std::io::stdout().lock();
    display_paged(log, page_size, advance.as_mut(), &mut out)?;
    Ok(())
}

/// Renders a report with `render` and sends it to stdout or to `output`.
///
/// File output is rendered in memory first; the file is only touched once
/// rendering has succeeded.
fn deliver<F>(output: Option<&Path>, render: F) -> Result<(), AnalyzerError>
where
    F: FnOnce(&mut dyn Write) -> Result<(), AnalyzerError>,
{
    match output {
        None => {
            let mut stdout = std::io::stdout().lock();
            render(&mut stdout)?;
            stdout.flush().map_err(ScanError::from)?;
        }
        Some(path) => {
            let mut report = Vec::new();
            render(&mut report)?;
            write_report(path, &report)?;
        }
    }
    Ok(())
}

fn run_severity(log: &LogFile, level: Severity, export: &ExportArgs) -> Result<(), AnalyzerError> {
    deliver(export.output.as_deref(), |out| {
        match export.format {
            ExportFormat::Text => {
                display_by_severity(log, level, out)?;
            }
            ExportFormat::Json => {
                let lines = collect_by_severity(log, level)?;
                let filter = MatchFilter::Severity(level.level());
                write_json(&MatchReport::new(log.path(), filter, lines), out)?;
            }
        }
        Ok(())
    })
}

fn run_search(log: &LogFile, pattern: &str, export: &ExportArgs) -> Result<(), AnalyzerError> {
    deliver(export.output.as_deref(), |out| {
        match export.format {
            ExportFormat::Text => {
                display_matching(log, pattern, out)?;
            }
            ExportFormat::Json => {
                let lines = collect_matching(log, pattern)?;
                let filter = MatchFilter::Pattern(pattern.into());
                write_json(&MatchReport::new(log.path(), filter, lines), out)?;
            }
        }
        Ok(())
    })
}

fn run_deny_rate(log: &LogFile, export: &ExportArgs) -> Result<(), AnalyzerError> {
    deliver(export.output.as_deref(), |out| {
        match export.format {
            ExportFormat::Text => {
                calculate_deny_rate(log, out)?;
            }
            ExportFormat::Json => {
                let tally = tally_connections(log)?;
                write_json(&DenyRateReport::new(log.path(), &tally), out)?;
            }
        }
        Ok(())
    })
}

fn section<W: Write>(out: &mut W, title: &str) -> Result<(), ScanError> {
    writeln!(out)?;
    writeln!(out, "=== {title} ===")?;
    Ok(())
}

/// Runs the four analyses in sequence with the profile's parameters.
fn run_all(log: &LogFile, profile: &Profile, no_pause: bool) -> Result<(), AnalyzerError> {
    let level = resolve_severity(None, profile)?;
    let mut advance = page_advance(no_pause);
    let mut out = std::io::stdout().lock();

    section(&mut out, "Paged display")?;
    display_paged(log, profile.page_size, advance.as_mut(), &mut out)?;

    section(&mut out, &format!("Severity {} messages", level.level()))?;
    display_by_severity(log, level, &mut out)?;

    section(&mut out, &format!("Search: '{}'", profile.search_pattern))?;
    display_matching(log, &profile.search_pattern, &mut out)?;

    section(&mut out, "Denied connection analysis")?;
    calculate_deny_rate(log, &mut out)?;
    Ok(())
}

