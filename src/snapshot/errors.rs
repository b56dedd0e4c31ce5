//! Snapshot error types
//!
//! Error codes:
//! - KEYLEDGER_SNAPSHOT_IO (ERROR severity)
//! - KEYLEDGER_SNAPSHOT_FORMAT (ERROR severity)
//! - KEYLEDGER_SNAPSHOT_CORRUPTION (FATAL severity)

use std::fmt;
use std::io;

/// Severity levels for snapshot errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, server continues
    Error,
    /// State cannot be trusted, process must not serve
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

/// Snapshot-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotErrorCode {
    /// I/O failure reading or writing the snapshot
    SnapshotIo,
    /// Snapshot could not be encoded/decoded or has an unknown version
    SnapshotFormat,
    /// Checksum mismatch or inconsistent state
    SnapshotCorruption,
}

impl SnapshotErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SnapshotErrorCode::SnapshotIo => "KEYLEDGER_SNAPSHOT_IO",
            SnapshotErrorCode::SnapshotFormat => "KEYLEDGER_SNAPSHOT_FORMAT",
            SnapshotErrorCode::SnapshotCorruption => "KEYLEDGER_SNAPSHOT_CORRUPTION",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            SnapshotErrorCode::SnapshotIo => Severity::Error,
            SnapshotErrorCode::SnapshotFormat => Severity::Error,
            SnapshotErrorCode::SnapshotCorruption => Severity::Fatal,
        }
    }
}

impl fmt::Display for SnapshotErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Snapshot error with context
#[derive(Debug)]
pub struct SnapshotError {
    code: SnapshotErrorCode,
    message: String,
    source: Option<io::Error>,
}

impl SnapshotError {
    /// I/O error with path context
    pub fn io_error_at_path(path: &std::path::Path, source: io::Error) -> Self {
        Self {
            code: SnapshotErrorCode::SnapshotIo,
            message: format!("I/O error at path: {}", path.display()),
            source: Some(source),
        }
    }

    pub fn format_error(message: impl Into<String>) -> Self {
        Self {
            code: SnapshotErrorCode::SnapshotFormat,
            message: message.into(),
            source: None,
        }
    }

    pub fn corruption(message: impl Into<String>) -> Self {
        Self {
            code: SnapshotErrorCode::SnapshotCorruption,
            message: message.into(),
            source: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SnapshotErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Corrupted state must never be served
    pub fn is_fatal(&self) -> bool {
        matches!(self.severity(), Severity::Fatal)
    }

    /// True if the snapshot file simply does not exist
    pub fn is_not_found(&self) -> bool {
        self.source
            .as_ref()
            .map(|e| e.kind() == io::ErrorKind::NotFound)
            .unwrap_or(false)
    }
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref source) = self.source {
            write!(f, " (caused by: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for snapshot operations
pub type SnapshotResult<T> = Result<T, SnapshotError>;
