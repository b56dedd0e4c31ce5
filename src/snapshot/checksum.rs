//! CRC32 checksums for snapshot payloads
//!
//! Uses CRC32 (IEEE polynomial) via the crc32fast crate.

use crc32fast::Hasher;

/// Computes a CRC32 checksum over the provided data.
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Formats a checksum as `crc32:xxxxxxxx` (lowercase hex, zero-padded)
///
/// ```
/// use keyledger::snapshot::format_checksum;
/// assert_eq!(format_checksum(0xDEADBEEF), "crc32:deadbeef");
/// ```
pub fn format_checksum(checksum: u32) -> String {
    format!("crc32:{:08x}", checksum)
}

/// Parses a formatted checksum back to u32. Returns `None` on bad format.
pub fn parse_checksum(formatted: &str) -> Option<u32> {
    let stripped = formatted.strip_prefix("crc32:")?;
    if stripped.len() != 8 {
        return None;
    }
    u32::from_str_radix(stripped, 16).ok()
}
