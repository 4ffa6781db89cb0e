//! Error types for the ridepool library
//!
//! This module provides error types using thiserror for all ridepool operations.

use crate::types::RecordId;
use thiserror::Error;

/// Main error type for ridepool operations
///
/// The four failure classes of a dialogue turn (malformed input, unknown
/// location, insert failure on completion, matching failure) never surface
/// here: each resolves into a [`Reply`](crate::dialogue::Reply). The
/// transport only sees a `BotError` for conditions it must handle itself.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BotError {
    /// Storage error
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Dialogue input error
    #[error("dialogue error: {0}")]
    Dialogue(#[from] DialogueError),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal error (should not happen in normal operation)
    #[error("internal error: {0}")]
    Internal(String),
}

/// Storage-related errors, raised by [`ReservationRepository`](crate::repository::ReservationRepository) implementors
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StorageError {
    /// Connection failed
    #[error("storage connection failed: {0}")]
    Connection(String),

    /// Query failed
    #[error("storage query failed: {0}")]
    Query(String),

    /// Record not found
    #[error("record not found: {0}")]
    NotFound(RecordId),

    /// Internal storage error
    #[error("internal storage error: {0}")]
    Internal(String),
}

/// Input-parsing errors raised while advancing a draft
///
/// Inside a dialogue turn these are mapped to corrective prompts; they only
/// escape as errors from the lower-level parsing APIs.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DialogueError {
    /// Route text did not split into origin and destination
    #[error("malformed route text: {0}")]
    MalformedRoute(String),

    /// Time text did not parse as HH:MM
    #[error("invalid reservation time: {0}")]
    InvalidTime(String),
}

/// Type alias for ridepool Result
pub type Result<T> = std::result::Result<T, BotError>;

/// Type alias for Storage Result
pub type StorageResult<T> = std::result::Result<T, StorageError>;
