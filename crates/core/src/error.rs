//! Core error types for Vantage.
//!
//! Construction and configuration problems are returned as typed errors.
//! Runtime degradations (probe failures, image load failures, module fetch
//! failures) are recovered locally and only described by [`Degradation`].

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Core error type for Vantage operations.
#[derive(Debug, Error)]
pub enum Error {
    // Descriptor errors
    #[error("image source path must not be empty")]
    EmptySourcePath,

    #[error("invalid dimension {value}: widths and heights must be positive")]
    InvalidWidth { value: u32 },

    #[error("unknown image format '{tag}'")]
    UnknownFormat { tag: String },

    // Observer configuration errors
    #[error("invalid threshold {value}: expected a fraction in [0, 1]")]
    InvalidThreshold { value: f64 },

    #[error("invalid root margin '{margin}': {reason}")]
    InvalidRootMargin { margin: String, reason: String },

    #[error("intersection observer unavailable: {reason}")]
    ObserverUnavailable { reason: String },

    // I/O errors
    #[error("failed to read file '{path}': {reason}")]
    FileReadFailed { path: PathBuf, reason: String },

    // Parsing errors
    #[error("TOML parse error: {reason}")]
    TomlParseFailed { reason: String },

    #[error("JSON serialization error: {reason}")]
    JsonSerializeFailed { reason: String },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl Error {
    /// Create a root margin error.
    pub fn invalid_root_margin(margin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRootMargin {
            margin: margin.into(),
            reason: reason.into(),
        }
    }

    /// Create an observer construction error.
    pub fn observer_unavailable(reason: impl Into<String>) -> Self {
        Self::ObserverUnavailable {
            reason: reason.into(),
        }
    }

    /// Create a file read error.
    pub fn file_read_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::FileReadFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a TOML parse error.
    pub fn toml_parse_failed(reason: impl Into<String>) -> Self {
        Self::TomlParseFailed {
            reason: reason.into(),
        }
    }

    /// Create a JSON serialization error.
    pub fn json_serialize_failed(reason: impl Into<String>) -> Self {
        Self::JsonSerializeFailed {
            reason: reason.into(),
        }
    }

    /// Create a configuration validation error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

/// Failures that are absorbed instead of propagated.
///
/// Only a double [`Degradation::SourceLoadFailure`] ever reaches a caller,
/// and it does so as an `on_error` notice, not as an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Degradation {
    /// The format probe rejected; the format is treated as unsupported.
    CapabilityProbeFailure,
    /// An image source failed to render.
    SourceLoadFailure,
    /// The deferred module could not be fetched; the poster stays.
    ModuleFetchFailure,
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapabilityProbeFailure => write!(f, "capability probe failure"),
            Self::SourceLoadFailure => write!(f, "source load failure"),
            Self::ModuleFetchFailure => write!(f, "module fetch failure"),
        }
    }
}

/// Rejection reason of a deferred module fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("module fetch failed: {reason}")]
pub struct FetchError {
    reason: String,
}

impl FetchError {
    /// Create a fetch error with a reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// The rejection reason.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::EmptySourcePath.to_string(),
            "image source path must not be empty"
        );

        let err = Error::invalid_root_margin("10em", "unsupported unit 'em'");
        assert_eq!(
            err.to_string(),
            "invalid root margin '10em': unsupported unit 'em'"
        );

        let err = Error::InvalidThreshold { value: 1.5 };
        assert!(err.to_string().contains("[0, 1]"));
    }

    #[test]
    fn test_fetch_error_reason() {
        let err = FetchError::new("404");
        assert_eq!(err.reason(), "404");
        assert_eq!(err.to_string(), "module fetch failed: 404");
    }

    #[test]
    fn test_degradation_display() {
        assert_eq!(
            Degradation::ModuleFetchFailure.to_string(),
            "module fetch failure"
        );
    }
}
