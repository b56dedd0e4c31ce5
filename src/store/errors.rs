//! # Record Store Errors
//!
//! Error kinds returned by the record store engine. Every precondition is
//! checked before mutation, so an error always means zero state change.

use thiserror::Error;

use super::record::RecordId;

/// Result type for record store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Record store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Empty key/value, malformed bulk lengths, bad new administrator
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Key is already permanently bound to a record
    #[error("Key already exists: {0}")]
    KeyConflict(String),

    /// Id or key has no binding
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Operation requires an active record
    #[error("Record {0} is inactive")]
    Inactive(RecordId),

    /// Reactivate called on an active record
    #[error("Record {0} is already active")]
    AlreadyActive(RecordId),

    /// Caller is neither creator nor administrator
    #[error("Not authorized: {0}")]
    Unauthorized(String),
}

impl StoreError {
    pub(crate) fn id_not_found(id: RecordId) -> Self {
        StoreError::NotFound(format!("id {}", id))
    }

    pub(crate) fn key_not_found(key: &str) -> Self {
        StoreError::NotFound(format!("key '{}'", key))
    }

    /// Stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::InvalidArgument(_) => "KEYLEDGER_INVALID_ARGUMENT",
            StoreError::KeyConflict(_) => "KEYLEDGER_KEY_CONFLICT",
            StoreError::NotFound(_) => "KEYLEDGER_NOT_FOUND",
            StoreError::Inactive(_) => "KEYLEDGER_INACTIVE",
            StoreError::AlreadyActive(_) => "KEYLEDGER_ALREADY_ACTIVE",
            StoreError::Unauthorized(_) => "KEYLEDGER_UNAUTHORIZED",
        }
    }

    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            StoreError::InvalidArgument(_) => 400,
            StoreError::Unauthorized(_) => 403,
            StoreError::NotFound(_) => 404,
            StoreError::KeyConflict(_) => 409,
            StoreError::AlreadyActive(_) => 409,
            StoreError::Inactive(_) => 410,
        }
    }
}
