//! Error types for the persistence layer.

use thiserror::Error;

/// Failure while loading or saving the persisted record set.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("storage io failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization failure: {0}")]
    Serde(#[from] serde_json::Error),
}
