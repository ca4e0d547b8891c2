//! Error types for mapfold.
//!
//! Library crates use [`MapfoldError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all mapfold operations.
#[derive(Debug, thiserror::Error)]
pub enum MapfoldError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A line in a mapping file does not have the expected token shape.
    #[error("malformed line {line} in {}: {message}", path.display())]
    Malformed {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// The auxiliary correlation table could not be interpreted.
    #[error("correlation table error: {message}")]
    Correlation { message: String },

    /// The input directory does not exist.
    #[error("input directory {} doesn't exist", path.display())]
    MissingInput { path: PathBuf },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, MapfoldError>;

impl MapfoldError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a malformed-line error for `path` at 1-based `line`.
    pub fn malformed(path: impl Into<PathBuf>, line: usize, msg: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            line,
            message: msg.into(),
        }
    }

    /// Create a correlation table error from any displayable message.
    pub fn correlation(msg: impl Into<String>) -> Self {
        Self::Correlation {
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

    /// Whether this error only invalidates a single input file.
    pub fn is_per_file(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }
}
