//! Error types for Postforge.
//!
//! Library crates use [`PostforgeError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all Postforge operations.
#[derive(Debug, thiserror::Error)]
pub enum PostforgeError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error from an external service adapter.
    #[error("network error: {0}")]
    Network(String),

    /// A generative adapter returned text with no extractable JSON object.
    #[error("malformed response from {stage}: {message}")]
    MalformedResponse { stage: &'static str, message: String },

    /// Database or storage layer error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (length bounds, invalid category, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PostforgeError>;

impl PostforgeError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a malformed-response error for a named pipeline stage.
    pub fn malformed(stage: &'static str, msg: impl Into<String>) -> Self {
        Self::MalformedResponse {
            stage,
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = PostforgeError::config("missing API key");
        assert_eq!(err.to_string(), "config error: missing API key");

        let err = PostforgeError::malformed("topic-research", "no JSON object in reply");
        assert!(err.to_string().contains("topic-research"));
        assert!(err.to_string().contains("no JSON object"));
    }
}
