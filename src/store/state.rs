//! Record table and its derived state.
//!
//! `StoreState` is the serializable part of the engine: the record table,
//! the indexes, the administrator and the running counters.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::errors::{StoreError, StoreResult};
use super::index::RecordIndexes;
use super::record::{ActorId, Record, RecordId};

/// A snapshot whose derived state disagrees with its record table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("State integrity violation: {0}")]
pub struct IntegrityViolation(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreState {
    administrator: ActorId,
    /// Ids handed out so far; the next id is `record_count + 1`
    record_count: u64,
    /// Maintained at store/delete/reactivate
    active_count: u64,
    records: BTreeMap<RecordId, Record>,
    indexes: RecordIndexes,
}

impl StoreState {
    pub fn new(administrator: ActorId) -> Self {
        Self {
            administrator,
            record_count: 0,
            active_count: 0,
            records: BTreeMap::new(),
            indexes: RecordIndexes::new(),
        }
    }

    pub fn administrator(&self) -> &ActorId {
        &self.administrator
    }

    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    pub fn active_count(&self) -> u64 {
        self.active_count
    }

    pub fn indexes(&self) -> &RecordIndexes {
        &self.indexes
    }

    pub fn record(&self, id: RecordId) -> StoreResult<&Record> {
        self.records
            .get(&id)
            .ok_or_else(|| StoreError::id_not_found(id))
    }

    fn record_mut(&mut self, id: RecordId) -> StoreResult<&mut Record> {
        self.records
            .get_mut(&id)
            .ok_or_else(|| StoreError::id_not_found(id))
    }

    pub fn is_administrator(&self, actor: &ActorId) -> bool {
        &self.administrator == actor
    }

    /// Creator or administrator
    pub fn may_modify(&self, actor: &ActorId, record: &Record) -> bool {
        &record.creator == actor || self.is_administrator(actor)
    }

    /// Records in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.indexes
            .all_ids()
            .iter()
            .filter_map(|id| self.records.get(id))
    }

    /// Insert a validated record; callers check key binding and emptiness first.
    pub(crate) fn insert(
        &mut self,
        creator: &ActorId,
        key: &str,
        value: &str,
        category: &str,
        now: DateTime<Utc>,
    ) -> RecordId {
        self.record_count += 1;
        let id = self.record_count;
        let record = Record::new(
            id,
            key.to_string(),
            value.to_string(),
            creator.clone(),
            category.to_string(),
            now,
        );
        self.indexes.insert(&record);
        self.records.insert(id, record);
        self.active_count += 1;
        id
    }

    /// Replace the value of an active record, returning the old value
    pub(crate) fn replace_value(
        &mut self,
        id: RecordId,
        new_value: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<String> {
        let record = self.record_mut(id)?;
        let old = std::mem::replace(&mut record.value, new_value.to_string());
        record.version += 1;
        record.last_modified = now;
        Ok(old)
    }

    pub(crate) fn set_active(
        &mut self,
        id: RecordId,
        active: bool,
        now: DateTime<Utc>,
    ) -> StoreResult<()> {
        let record = self.record_mut(id)?;
        if record.active == active {
            return Ok(());
        }
        record.active = active;
        record.last_modified = now;
        if active {
            self.active_count += 1;
        } else {
            self.active_count -= 1;
        }
        Ok(())
    }

    pub(crate) fn set_administrator(&mut self, admin: ActorId) -> ActorId {
        std::mem::replace(&mut self.administrator, admin)
    }

    /// Count active records by scanning every id
    pub fn scan_active_count(&self) -> u64 {
        self.iter().filter(|r| r.active).count() as u64
    }

    /// Check every table/index invariant. Used after loading a snapshot.
    pub fn verify(&self) -> Result<(), IntegrityViolation> {
        let violation = |msg: String| Err(IntegrityViolation(msg));

        if self.administrator.is_null() {
            return violation("administrator is the null identity".into());
        }

        if self.records.len() as u64 != self.record_count {
            return violation(format!(
                "record table holds {} records but counter is {}",
                self.records.len(),
                self.record_count
            ));
        }

        let all_ids = self.indexes.all_ids();
        if all_ids.len() as u64 != self.record_count
            || all_ids.iter().zip(1..).any(|(id, expected)| *id != expected)
        {
            return violation("all-ids list is not the sequence 1..=count".into());
        }

        for (id, record) in &self.records {
            if *id != record.id {
                return violation(format!("record stored under {} claims id {}", id, record.id));
            }
            if record.key.is_empty() || record.value.is_empty() {
                return violation(format!("record {} has an empty key or value", id));
            }
            if record.version == 0 {
                return violation(format!("record {} has version 0", id));
            }
        }

        if self.indexes.bound_keys() as u64 != self.record_count {
            return violation("key index size differs from record count".into());
        }
        for (key, id) in self.indexes.key_entries() {
            match self.records.get(id) {
                Some(record) if &record.key == key => {}
                _ => return violation(format!("key '{}' points at wrong or missing id {}", key, id)),
            }
        }

        let mut creator_entries = 0u64;
        for (creator, ids) in self.indexes.creator_entries() {
            for id in ids {
                match self.records.get(id) {
                    Some(record) if &record.creator == creator => creator_entries += 1,
                    _ => return violation(format!("creator index for '{}' holds bad id {}", creator, id)),
                }
            }
        }
        if creator_entries != self.record_count {
            return violation("creator index does not cover every record".into());
        }

        let mut category_entries = 0usize;
        for (category, ids) in self.indexes.category_entries() {
            for id in ids {
                match self.records.get(id) {
                    Some(record) if &record.category == category => category_entries += 1,
                    _ => return violation(format!("category index for '{}' holds bad id {}", category, id)),
                }
            }
        }
        let categorized = self.records.values().filter(|r| !r.is_uncategorized()).count();
        if category_entries != categorized {
            return violation("category index does not cover every categorized record".into());
        }

        let scanned = self.scan_active_count();
        if scanned != self.active_count {
            return violation(format!(
                "active counter is {} but scan finds {}",
                self.active_count, scanned
            ));
        }

        Ok(())
    }
}
