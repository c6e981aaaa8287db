//! Error types for content validation.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// A fatal configuration failure.
///
/// Only the project root and the two top-level configuration documents
/// (categories and media types) can produce this error. Without them no
/// further check is meaningful, so `validate_project` returns early.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The project root does not exist or is not a directory.
    #[error("project directory not found: {}", path.display())]
    ProjectRoot { path: PathBuf },
    /// A configuration document does not exist.
    #[error("configuration file not found: {}", path.display())]
    Missing { path: PathBuf },
    /// A configuration document exists but could not be read.
    #[error("failed to read configuration file {}: {message}", path.display())]
    Io { path: PathBuf, message: String },
    /// A configuration document is not valid JSON.
    #[error("invalid JSON in configuration file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
    /// A configuration document is JSON but not the expected list of records.
    #[error("unexpected shape in configuration file {}: {message}", path.display())]
    Shape { path: PathBuf, message: String },
}

impl From<SourceError> for ConfigError {
    fn from(err: SourceError) -> Self {
        let SourceError {
            file,
            kind,
            message,
        } = err;
        match kind {
            SourceErrorKind::Missing => Self::Missing { path: file },
            SourceErrorKind::JsonParseError => Self::Parse {
                path: file,
                message,
            },
            SourceErrorKind::IoError
            | SourceErrorKind::FileTooLarge
            | SourceErrorKind::InvalidEncoding
            | SourceErrorKind::WalkError
            | SourceErrorKind::InvalidExcludePattern => Self::Io {
                path: file,
                message,
            },
        }
    }
}

/// The kind of failure that prevented a source file from being loaded.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum SourceErrorKind {
    /// The file does not exist.
    Missing,
    /// An I/O error occurred while reading the file.
    IoError,
    /// The file exceeded the configured maximum size limit.
    FileTooLarge,
    /// The file content is not valid UTF-8.
    InvalidEncoding,
    /// The file content could not be parsed as valid JSON.
    JsonParseError,
    /// A directory traversal error (permission denied, loop detected, etc.).
    WalkError,
    /// An exclude glob pattern could not be parsed.
    InvalidExcludePattern,
}

/// A source-level error: a file that could not be loaded at all.
///
/// Loaders turn these into findings attributed to the file; they never
/// abort a run on their own.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub struct SourceError {
    /// Path of the file, relative to the project root.
    pub file: PathBuf,
    /// The kind of failure.
    pub kind: SourceErrorKind,
    /// Human-readable description of the failure.
    pub message: String,
}

impl SourceError {
    pub(crate) fn new(file: impl Into<PathBuf>, kind: SourceErrorKind, message: String) -> Self {
        Self {
            file: file.into(),
            kind,
            message,
        }
    }

    /// Format the error for human-readable output.
    #[must_use]
    pub fn format_human_readable(&self) -> String {
        format!("{}: {}", self.file.display(), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_source_becomes_missing_config() {
        let err = SourceError::new(
            "config/categories.json",
            SourceErrorKind::Missing,
            "not found".to_owned(),
        );
        let config_err = ConfigError::from(err);
        assert!(matches!(config_err, ConfigError::Missing { .. }));
        assert_eq!(
            config_err.to_string(),
            "configuration file not found: config/categories.json"
        );
    }

    #[test]
    fn test_parse_source_keeps_message() {
        let err = SourceError::new(
            "config/media-types.json",
            SourceErrorKind::JsonParseError,
            "expected value at line 1 column 1".to_owned(),
        );
        let msg = ConfigError::from(err).to_string();
        assert!(msg.contains("invalid JSON"), "got: {msg}");
        assert!(msg.contains("line 1 column 1"), "got: {msg}");
    }

    #[test]
    fn test_format_human_readable() {
        let err = SourceError::new(
            "data/image.json",
            SourceErrorKind::FileTooLarge,
            "File exceeds maximum size of 10 bytes".to_owned(),
        );
        assert_eq!(
            err.format_human_readable(),
            "data/image.json: File exceeds maximum size of 10 bytes"
        );
    }
}
