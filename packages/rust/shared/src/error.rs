//! Error types for Scribe.
//!
//! Library crates use [`ScribeError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all Scribe operations.
#[derive(Debug, thiserror::Error)]
pub enum ScribeError {
    /// Configuration loading or credential resolution error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while fetching the tag vocabulary.
    #[error("network error: {0}")]
    Network(String),

    /// Completion endpoint error (transport, auth, status, or empty choices).
    #[error("api error: {0}")]
    Api(String),

    /// Malformed markdown document or front-matter block.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// A remote response did not have the expected shape.
    #[error("format error: {message}")]
    Format { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScribeError>;

impl ScribeError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a format error from any displayable message.
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format {
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
