//! Record store engine for keyledger
//!
//! A single-tenant, versioned key-value record store. Every mutation is
//! attributed to an actor, ordered, and returned with the events it emitted.
//!
//! # Invariants
//!
//! - Ids start at 1, grow by 1, are never reused. Id 0 means "absent".
//! - A key is bound to its id forever, even after the record is deleted.
//! - Versions start at 1 and change only on update.
//! - Deletion is logical; records are never physically removed.
//! - Bulk stores apply entirely or not at all.
//!
//! # Usage
//!
//! ```
//! use keyledger::store::{ActorId, RecordStore};
//!
//! let admin = ActorId::new("admin");
//! let alice = ActorId::new("alice");
//! let mut store = RecordStore::new(admin);
//!
//! let id = store.store(&alice, "greeting", "hello", "notes").unwrap().value;
//! store.update(&alice, id, "hello again").unwrap();
//! assert_eq!(store.get(id).unwrap().version, 2);
//! ```

mod clock;
mod engine;
mod errors;
mod events;
mod index;
mod record;
mod state;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::RecordStore;
pub use errors::{StoreError, StoreResult};
pub use events::{Committed, EventKind, StoreEvent};
pub use index::RecordIndexes;
pub use record::{ActorId, KeyStatus, Record, RecordId, RecordMetadata, StoreStats, NO_RECORD};
pub use state::{IntegrityViolation, StoreState};
