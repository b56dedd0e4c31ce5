//! # Store Events
//!
//! Outbound notifications produced by mutators. The engine returns them with
//! each result and never publishes them itself; delivery belongs to whoever
//! drives the engine.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::{ActorId, RecordId};

/// Kind of store event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Stored,
    Updated,
    Deleted,
    OwnershipTransferred,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Stored => "STORED",
            EventKind::Updated => "UPDATED",
            EventKind::Deleted => "DELETED",
            EventKind::OwnershipTransferred => "OWNERSHIP_TRANSFERRED",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Event emitted by a successful mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StoreEvent {
    Stored {
        id: RecordId,
        key: String,
        value: String,
        actor: ActorId,
        timestamp: DateTime<Utc>,
    },
    Updated {
        id: RecordId,
        old_value: String,
        new_value: String,
        actor: ActorId,
        timestamp: DateTime<Utc>,
    },
    Deleted {
        id: RecordId,
        actor: ActorId,
        timestamp: DateTime<Utc>,
    },
    OwnershipTransferred {
        previous_admin: ActorId,
        new_admin: ActorId,
        timestamp: DateTime<Utc>,
    },
}

impl StoreEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            StoreEvent::Stored { .. } => EventKind::Stored,
            StoreEvent::Updated { .. } => EventKind::Updated,
            StoreEvent::Deleted { .. } => EventKind::Deleted,
            StoreEvent::OwnershipTransferred { .. } => EventKind::OwnershipTransferred,
        }
    }

    /// Record the event refers to, if any
    pub fn record_id(&self) -> Option<RecordId> {
        match self {
            StoreEvent::Stored { id, .. }
            | StoreEvent::Updated { id, .. }
            | StoreEvent::Deleted { id, .. } => Some(*id),
            StoreEvent::OwnershipTransferred { .. } => None,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            StoreEvent::Stored { timestamp, .. }
            | StoreEvent::Updated { timestamp, .. }
            | StoreEvent::Deleted { timestamp, .. }
            | StoreEvent::OwnershipTransferred { timestamp, .. } => *timestamp,
        }
    }
}

/// Result of a committed operation together with the events it emitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed<T> {
    pub value: T,
    pub events: Vec<StoreEvent>,
}

impl<T> Committed<T> {
    pub fn new(value: T, events: Vec<StoreEvent>) -> Self {
        Self { value, events }
    }

    /// A commit that emitted nothing
    pub fn silent(value: T) -> Self {
        Self {
            value,
            events: Vec::new(),
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Committed<U> {
        Committed {
            value: f(self.value),
            events: self.events,
        }
    }
}
