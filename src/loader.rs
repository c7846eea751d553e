use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::log_file::Decoding;
use crate::severity::Severity;


/// Error type for `loader` operations.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// YAML parsing error
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
    /// Unsupported file format
    #[error("Unsupported file format: {path}")]
    UnsupportedFileFormat {
        /// File path
        path: String,
    },
    /// The profile parsed but holds an unusable value
    #[error("Invalid profile {path}: {message}")]
    InvalidProfile {
        /// File path
        path: String,
        /// What is wrong
        message: String,
    },
}

/// Analysis parameters, loaded from a YAML or JSON profile.
///
/// Every field is optional in the file; missing fields take the values of
/// [`Profile::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Profile {
    /// Log file to analyse
    pub log_path: Option<PathBuf>,
    /// Lines per page for paged display
    pub page_size: usize,
    /// Severity level (0-7) for the severity filter
    pub severity: u8,
    /// Literal text for the message search
    pub search_pattern: String,
    /// Handling of invalid UTF-8
    pub decoding: Decoding,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            log_path: None,
            page_size: 5,
            severity: Severity::Warnings.level(),
            search_pattern: "access-list acl_in permitted".to_string(),
            decoding: Decoding::Skip,
        }
    }
}

impl Profile {
    /// Severity as a typed level.
    ///
    /// # Errors
    /// Returns the raw value if it is above 7.
    pub fn severity_level(&self) -> Result<Severity, u8> {
        Severity::try_from(self.severity)
    }
}

fn get_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

fn load_profile_from<F>(path: &Path, parse: F) -> Result<Profile, LoaderError>
where
    F: Fn(&str) -> Result<Profile, LoaderError>,
{
    let contents = std::fs::read_to_string(path).map_err(LoaderError::Io)?;
    // An empty file is an empty mapping, not a parse error.
    if contents.trim().is_empty() {
        return Ok(Profile::default());
    }
    parse(&contents)
}

/// Loads a profile from a YAML file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn load_profile_yaml(path: &Path) -> Result<Profile, LoaderError> {
    load_profile_from(path, |c| serde_yaml::from_str(c).map_err(LoaderError::YamlParse))
}

/// Loads a profile from a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn load_profile_json(path: &Path) -> Result<Profile, LoaderError> {
    load_profile_from(path, |c| serde_json::from_str(c).map_err(LoaderError::JsonParse))
}

/// Loads and validates a profile, or returns the defaults when `path` is `None`.
///
/// The format is chosen from the extension: `.yaml`/`.yml` or `.json`.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed, has an unknown
/// extension, or holds a zero page size or a severity above 7.
pub fn load_profile(path: Option<&Path>) -> Result<Profile, LoaderError> {
    let Some(path) = path else {
        return Ok(Profile::default());
    };
    let profile = match get_extension(path).as_deref() {
        Some("yaml" | "yml") => load_profile_yaml(path)?,
        Some("json") => load_profile_json(path)?,
        _ => {
            return Err(LoaderError::UnsupportedFileFormat {
                path: path.display().to_string(),
            });
        }
    };
    validate(&profile, path)?;
    info!("Loaded profile from {}", path.display());
    Ok(profile)
}

fn validate(profile: &Profile, path: &Path) -> Result<(), LoaderError> {
    let invalid = |message: String| LoaderError::InvalidProfile {
        path: path.display().to_string(),
        message,
    };
    if profile.page_size == 0 {
        return Err(invalid("page_size must be greater than zero".into()));
    }
    if let Err(level) = profile.severity_level() {
        return Err(invalid(format!("severity {level} is out of range (0-7)")));
    }
    Ok(())
}
