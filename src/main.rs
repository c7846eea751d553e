//! ASA Log Analyzer CLI
//!
//! This binary reads a Cisco ASA firewall log and pages through it, filters it by
//! severity, searches it, or reports the share of denied connections.
//!
//! # Example
//! ```sh
//! asa_log_analyzer --log asa.log severity --level 4
//! ```

use asa_log_analyzer::{run_analyzer, Args};
use clap::Parser;
use std::io::IsTerminal;
use std::process;
use tracing::error;
use tracing::Level;

/// Entry point for the asa_log_analyzer CLI.
fn main() {
    let args = Args::parse();

    let level = if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .without_time()
        .with_target(false)
        .with_max_level(level)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run_analyzer(args) {
        error!("{}", e);
        process::exit(1);
    }
}
