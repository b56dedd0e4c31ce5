//! Observable lifecycle and operation events

use std::fmt;

/// Observable events in keyledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Boot & lifecycle
    BootStart,
    BootComplete,
    ConfigLoaded,
    Serving,
    ShutdownComplete,

    // Snapshot
    SnapshotLoaded,
    SnapshotWritten,
    SnapshotFailed,
    /// Snapshot failed its integrity checks (FATAL)
    SnapshotCorruption,

    // Record operations
    RecordStored,
    RecordsBulkStored,
    RecordUpdated,
    RecordDeleted,
    RecordReactivated,
    OwnershipTransferred,
    OperationRejected,
    RequestInvalid,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "BOOT_START",
            Event::BootComplete => "BOOT_COMPLETE",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::Serving => "SERVING",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",
            Event::SnapshotLoaded => "SNAPSHOT_LOADED",
            Event::SnapshotWritten => "SNAPSHOT_WRITTEN",
            Event::SnapshotFailed => "SNAPSHOT_FAILED",
            Event::SnapshotCorruption => "SNAPSHOT_CORRUPTION",
            Event::RecordStored => "RECORD_STORED",
            Event::RecordsBulkStored => "RECORDS_BULK_STORED",
            Event::RecordUpdated => "RECORD_UPDATED",
            Event::RecordDeleted => "RECORD_DELETED",
            Event::RecordReactivated => "RECORD_REACTIVATED",
            Event::OwnershipTransferred => "OWNERSHIP_TRANSFERRED",
            Event::OperationRejected => "OPERATION_REJECTED",
            Event::RequestInvalid => "REQUEST_INVALID",
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::SnapshotCorruption)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
