//! # Store Errors
//!
//! Failures raised by record store implementations.

use thiserror::Error;

/// Result type for record store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Record store errors
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The backing store could not serve the request
    #[error("Record store unavailable: {0}")]
    Unavailable(String),

    /// A record with the same primary key already exists
    #[error("Duplicate primary key: {0}")]
    Conflict(String),

    /// The record is not shaped the way the store expects
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}
