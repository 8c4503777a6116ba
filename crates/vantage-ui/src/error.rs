//! Error types for the browser platform layer
//!
//! Platform failures are converted into `vantage_core::Error` at the
//! capability-trait boundary, or logged and absorbed where the core treats
//! them as degradations.

use vantage_core::Error;

/// Errors raised while talking to browser APIs
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    /// No window object (not running in a browser)
    #[error("failed to get window: window is not available")]
    WindowNotAvailable,

    /// IntersectionObserver construction failed or is unsupported
    #[error("failed to create intersection observer: {0}")]
    ObserverFailed(String),

    /// requestIdleCallback rejected the callback
    #[error("failed to request idle callback: {0}")]
    IdleCallbackFailed(String),

    /// A probe image could not be created
    #[error("failed to create probe image: {0}")]
    ProbeImageFailed(String),

    /// A dynamic import promise rejected
    #[error("failed to import module '{url}': {reason}")]
    ImportFailed { url: String, reason: String },
}

impl From<PlatformError> for Error {
    fn from(error: PlatformError) -> Self {
        Self::observer_unavailable(error.to_string())
    }
}

/// Render a thrown JS value for an error message.
#[must_use]
pub fn describe_js(value: &wasm_bindgen::JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{value:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = PlatformError::ObserverFailed("unsupported".to_string());
        assert_eq!(
            error.to_string(),
            "failed to create intersection observer: unsupported"
        );

        let error = PlatformError::ImportFailed {
            url: "/heavy.js".to_string(),
            reason: "404".to_string(),
        };
        assert_eq!(error.to_string(), "failed to import module '/heavy.js': 404");
    }

    #[test]
    fn test_converts_into_core_error() {
        let error: Error = PlatformError::WindowNotAvailable.into();
        assert!(matches!(error, Error::ObserverUnavailable { .. }));
    }
}
