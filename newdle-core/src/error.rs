//! Core error types for newdle.

use thiserror::Error;

/// Core error type for newdle model operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A slot timestamp did not match the `YYYY-MM-DDTHH:MM` format.
    #[error("Invalid slot time: {0}")]
    InvalidSlotTime(String),

    /// A model failed validation before being sent.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
