use thiserror::Error;

use crate::log_file::LogFileError;

/// Error type for the scanning operations (paging, filtering, search, deny rate).
#[derive(Error, Debug)]
pub enum ScanError {
    /// The log file could not be opened, read or decoded
    #[error(transparent)]
    LogFile(#[from] LogFileError),

    /// Writing the output failed
    #[error("output error: {0}")]
    Output(#[from] std::io::Error),

    /// Pagination was asked for pages of zero lines
    #[error("page size must be greater than zero")]
    ZeroPageSize,
}

/// Result alias for scanning operations.
pub type Result<T> = std::result::Result<T, ScanError>;
