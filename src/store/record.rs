//! # Record Types
//!
//! The record entity and the read-only views returned by queries.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Numeric record identifier. Zero never denotes a real record.
pub type RecordId = u64;

/// Sentinel for "no record"
pub const NO_RECORD: RecordId = 0;

/// Authenticated actor identity
///
/// The engine never verifies identities; it only compares them.
/// The empty identity is the null identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The null identity
    pub fn null() -> Self {
        Self(String::new())
    }

    pub fn is_null(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActorId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ActorId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A stored record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub key: String,
    pub value: String,
    pub creator: ActorId,
    pub last_modified: DateTime<Utc>,
    pub active: bool,
    /// Empty means uncategorized
    pub category: String,
    pub version: u64,
}

impl Record {
    pub(crate) fn new(
        id: RecordId,
        key: String,
        value: String,
        creator: ActorId,
        category: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            key,
            value,
            creator,
            last_modified: now,
            active: true,
            category,
            version: 1,
        }
    }

    pub fn is_uncategorized(&self) -> bool {
        self.category.is_empty()
    }

    pub fn metadata(&self) -> RecordMetadata {
        RecordMetadata {
            creator: self.creator.clone(),
            last_modified: self.last_modified,
            version: self.version,
            category: self.category.clone(),
        }
    }
}

/// Metadata view, available for inactive records too
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub creator: ActorId,
    pub last_modified: DateTime<Utc>,
    pub version: u64,
    pub category: String,
}

/// Result of a key existence check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyStatus {
    pub exists: bool,
    pub is_active: bool,
}

/// Store-wide statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_records: u64,
    pub active_records: u64,
    /// Length of the all-ids list. Historically reported as "total users";
    /// it counts records, not people.
    pub total_ids_tracked: u64,
    pub administrator: ActorId,
    /// True number of distinct creators
    pub distinct_creators: u64,
}
