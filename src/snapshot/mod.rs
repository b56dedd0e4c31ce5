//! Snapshot persistence for keyledger
//!
//! The record store assumes a durable substrate underneath it. For the CLI
//! and HTTP adapters that substrate is a single checksummed snapshot file
//! rewritten after every committed mutation.
//!
//! # Design Principles
//!
//! - Atomic visibility (temp file, fsync, rename)
//! - Explicit integrity verification on load (CRC32 + state invariants)
//! - Corruption is never ignored

mod checksum;
mod errors;
mod file;

pub use checksum::{compute_checksum, format_checksum, parse_checksum};
pub use errors::{Severity, SnapshotError, SnapshotErrorCode, SnapshotResult};
pub use file::{
    read_snapshot, snapshot_exists, snapshot_path, write_snapshot, FORMAT_VERSION, SNAPSHOT_FILE,
};
