//! Error types for the progression engine.

use thiserror::Error;

/// Engine errors. None of these are fatal to a session: the in-memory
/// program stays valid whenever one is returned.
#[derive(Error, Debug)]
pub enum GradusError {
    /// Import document failed shape validation or could not be decoded.
    #[error("invalid import: {0}")]
    InvalidImport(String),

    /// Backing store could not be read or written.
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Document (de)serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
