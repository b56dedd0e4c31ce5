//! API error types
//!
//! API errors are pass-through: store error codes reach the caller
//! unchanged so they can tell "key taken" from "not authorized".

use std::fmt;

use crate::snapshot::SnapshotError;
use crate::store::StoreError;

/// API error severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Request failed, server continues
    Error,
    /// System must halt
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// API-level error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCode {
    /// Malformed request
    InvalidRequest,
    /// Unknown `op`
    UnknownOperation,
    /// Mutation could not be made durable and was rolled back
    PersistenceFailed,
    /// The request never reached the store
    Internal,
}

impl ApiErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            ApiErrorCode::InvalidRequest => "KEYLEDGER_INVALID_REQUEST",
            ApiErrorCode::UnknownOperation => "KEYLEDGER_UNKNOWN_OPERATION",
            ApiErrorCode::PersistenceFailed => "KEYLEDGER_PERSISTENCE_FAILED",
            ApiErrorCode::Internal => "KEYLEDGER_INTERNAL",
        }
    }
}

impl fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// API error with the originating code preserved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    code: String,
    message: String,
    severity: Severity,
    status: u16,
    /// True when the store itself refused the operation
    rejected: bool,
}

impl ApiError {
    fn new(code: ApiErrorCode, message: String, severity: Severity, status: u16) -> Self {
        Self {
            code: code.code().to_string(),
            message,
            severity,
            status,
            rejected: false,
        }
    }

    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::InvalidRequest, reason.into(), Severity::Error, 400)
    }

    pub fn unknown_operation(op: impl Into<String>) -> Self {
        Self::new(
            ApiErrorCode::UnknownOperation,
            format!("Unknown operation: {}", op.into()),
            Severity::Error,
            400,
        )
    }

    /// Snapshot write failed; the mutation was rolled back
    pub fn persistence_failed(err: &SnapshotError) -> Self {
        let severity = if err.is_fatal() {
            Severity::Fatal
        } else {
            Severity::Error
        };
        Self::new(
            ApiErrorCode::PersistenceFailed,
            err.to_string(),
            severity,
            500,
        )
    }

    pub fn internal(reason: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::Internal, reason.into(), Severity::Error, 500)
    }

    /// Pass a store error through unchanged
    pub fn from_store_error(err: StoreError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            severity: Severity::Error,
            status: err.status_code(),
            rejected: true,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn status_code(&self) -> u16 {
        self.status
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self.severity, Severity::Fatal)
    }

    /// A store precondition failed, as opposed to a malformed request
    pub fn is_rejection(&self) -> bool {
        self.rejected
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::from_store_error(err)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_request_error() {
        let err = ApiError::invalid_request("missing field");
        assert_eq!(err.code(), "KEYLEDGER_INVALID_REQUEST");
        assert_eq!(err.status_code(), 400);
        assert!(!err.is_fatal());
        assert!(!err.is_rejection());
    }

    #[test]
    fn test_unknown_operation_error() {
        let err = ApiError::unknown_operation("frobnicate");
        assert_eq!(err.code(), "KEYLEDGER_UNKNOWN_OPERATION");
        assert!(err.message().contains("frobnicate"));
    }

    #[test]
    fn test_store_error_pass_through() {
        let err = ApiError::from(StoreError::KeyConflict("k1".into()));
        assert_eq!(err.code(), "KEYLEDGER_KEY_CONFLICT");
        assert_eq!(err.status_code(), 409);
        assert!(err.is_rejection());
        assert!(err.to_string().contains("k1"));
    }
}
