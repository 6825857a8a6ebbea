//! # Document Store Errors

use std::io;

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures raised by a document store engine
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A document or snapshot could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The persisted snapshot failed validation
    #[error("Corrupted snapshot: {0}")]
    Corrupted(String),

    /// A document violated the store's structural rules
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// An insert reused an identifier already present
    #[error("Duplicate identifier: {0}")]
    DuplicateId(String),

    /// A writer panicked while holding the collection lock
    #[error("Collection lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    pub fn corrupted(msg: impl Into<String>) -> Self {
        Self::Corrupted(msg.into())
    }

    pub fn invalid_document(msg: impl Into<String>) -> Self {
        Self::InvalidDocument(msg.into())
    }
}
