//! Snapshot file reading and writing
//!
//! Format (`<data_dir>/state.json`):
//! ```json
//! {
//!   "format_version": 1,
//!   "created_at": "2026-02-04T11:30:00Z",
//!   "checksum": "crc32:deadbeef",
//!   "state": "<store state as JSON text>"
//! }
//! ```
//!
//! The state is embedded as text so the checksum covers the exact bytes
//! that were written. Writes go to a temp file, are fsynced, then renamed
//! over the previous snapshot.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::store::StoreState;

use super::checksum::{compute_checksum, format_checksum, parse_checksum};
use super::errors::{SnapshotError, SnapshotResult};

/// Snapshot file name inside the data directory
pub const SNAPSHOT_FILE: &str = "state.json";

/// Current format version
pub const FORMAT_VERSION: u8 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotEnvelope {
    format_version: u8,
    created_at: String,
    checksum: String,
    state: String,
}

/// Path of the snapshot file for a data directory
pub fn snapshot_path(data_dir: &Path) -> PathBuf {
    data_dir.join(SNAPSHOT_FILE)
}

pub fn snapshot_exists(data_dir: &Path) -> bool {
    snapshot_path(data_dir).is_file()
}

/// Durably write `state` as the current snapshot
pub fn write_snapshot(data_dir: &Path, state: &StoreState) -> SnapshotResult<PathBuf> {
    let body = serde_json::to_string(state)
        .map_err(|e| SnapshotError::format_error(format!("Failed to encode state: {}", e)))?;

    let envelope = SnapshotEnvelope {
        format_version: FORMAT_VERSION,
        created_at: Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        checksum: format_checksum(compute_checksum(body.as_bytes())),
        state: body,
    };
    let bytes = serde_json::to_vec_pretty(&envelope)
        .map_err(|e| SnapshotError::format_error(format!("Failed to encode snapshot: {}", e)))?;

    let final_path = snapshot_path(data_dir);
    let tmp_path = data_dir.join(format!("{}.tmp", SNAPSHOT_FILE));

    {
        let mut file =
            File::create(&tmp_path).map_err(|e| SnapshotError::io_error_at_path(&tmp_path, e))?;
        file.write_all(&bytes)
            .map_err(|e| SnapshotError::io_error_at_path(&tmp_path, e))?;
        // fsync is mandatory before the rename makes it visible
        file.sync_all()
            .map_err(|e| SnapshotError::io_error_at_path(&tmp_path, e))?;
    }

    fs::rename(&tmp_path, &final_path)
        .map_err(|e| SnapshotError::io_error_at_path(&final_path, e))?;
    fsync_dir(data_dir)?;

    Ok(final_path)
}

/// Read, checksum-verify and integrity-check the current snapshot
pub fn read_snapshot(data_dir: &Path) -> SnapshotResult<StoreState> {
    let path = snapshot_path(data_dir);
    let content = fs::read(&path).map_err(|e| SnapshotError::io_error_at_path(&path, e))?;

    let envelope: SnapshotEnvelope = serde_json::from_slice(&content)
        .map_err(|e| SnapshotError::format_error(format!("Invalid snapshot JSON: {}", e)))?;

    if envelope.format_version != FORMAT_VERSION {
        return Err(SnapshotError::format_error(format!(
            "Unsupported snapshot format version {}",
            envelope.format_version
        )));
    }

    let expected = parse_checksum(&envelope.checksum).ok_or_else(|| {
        SnapshotError::format_error(format!("Malformed checksum '{}'", envelope.checksum))
    })?;
    let actual = compute_checksum(envelope.state.as_bytes());
    if expected != actual {
        return Err(SnapshotError::corruption(format!(
            "Snapshot checksum mismatch: expected {}, got {}",
            format_checksum(expected),
            format_checksum(actual)
        )));
    }

    let state: StoreState = serde_json::from_str(&envelope.state)
        .map_err(|e| SnapshotError::format_error(format!("Invalid store state: {}", e)))?;
    state
        .verify()
        .map_err(|e| SnapshotError::corruption(e.to_string()))?;

    Ok(state)
}

#[cfg(unix)]
fn fsync_dir(path: &Path) -> SnapshotResult<()> {
    let dir = OpenOptions::new()
        .read(true)
        .open(path)
        .map_err(|e| SnapshotError::io_error_at_path(path, e))?;
    dir.sync_all()
        .map_err(|e| SnapshotError::io_error_at_path(path, e))
}

#[cfg(not(unix))]
fn fsync_dir(_path: &Path) -> SnapshotResult<()> {
    Ok(())
}
