//! Centralized error types for msg2eml.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the msg2eml library.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// I/O error with the associated file path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified file does not exist.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// The file is not an Outlook item (not a compound file, or no property stream).
    #[error("Not a valid Outlook message '{path}': {reason}")]
    InvalidMsg { path: PathBuf, reason: String },

    /// A MAPI property stream is truncated or malformed.
    #[error("Malformed property stream '{stream}': {reason}")]
    InvalidProperty { stream: String, reason: String },
}

/// Convenience alias for `Result<T, ConvertError>`.
pub type Result<T> = std::result::Result<T, ConvertError>;

impl ConvertError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an `InvalidMsg` variant.
    pub fn invalid_msg(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidMsg {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Allow `?` on `std::io::Error` inside functions returning `ConvertError`
/// when no path context is available (rare, prefer `ConvertError::io`).
impl From<std::io::Error> for ConvertError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::from("<unknown>"),
            source,
        }
    }
}
