//! Error types for the roll history.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for history operations.
pub type HistoryResult<T> = Result<T, HistoryError>;

/// Errors that can occur while reading or writing the roll history.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The history file could not be read or written.
    #[error("history unavailable at {}: {source}", .path.display())]
    Io {
        /// The file or directory that failed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The history document could not be encoded or decoded.
    #[error("corrupt history: {0}")]
    Serialization(String),
}

impl HistoryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
