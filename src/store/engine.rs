//! Record Store Engine
//!
//! Owns the record table and enforces every invariant. Mutators check all
//! of their preconditions before touching state, so a rejected call is
//! side-effect free and a failed attempt never consumes an id.
//!
//! The engine does no locking. Callers that share it between threads must
//! serialize access to the whole engine (see `api::ApiHandler`).

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::clock::{Clock, SystemClock};
use super::errors::{StoreError, StoreResult};
use super::events::{Committed, StoreEvent};
use super::record::{ActorId, KeyStatus, Record, RecordId, RecordMetadata, StoreStats};
use super::state::StoreState;

pub struct RecordStore {
    state: StoreState,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStore")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl RecordStore {
    /// Create an empty store administered by `administrator`
    pub fn new(administrator: ActorId) -> Self {
        Self::with_clock(administrator, Arc::new(SystemClock))
    }

    pub fn with_clock(administrator: ActorId, clock: Arc<dyn Clock>) -> Self {
        Self::from_state(StoreState::new(administrator), clock)
    }

    /// Resume from previously captured state
    pub fn from_state(state: StoreState, clock: Arc<dyn Clock>) -> Self {
        Self { state, clock }
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn into_state(self) -> StoreState {
        self.state
    }

    /// Swap in another state, returning the current one
    pub fn replace_state(&mut self, state: StoreState) -> StoreState {
        std::mem::replace(&mut self.state, state)
    }

    pub fn administrator(&self) -> &ActorId {
        self.state.administrator()
    }

    // ==================
    // Mutators
    // ==================

    /// Create a record and return its id
    pub fn store(
        &mut self,
        actor: &ActorId,
        key: &str,
        value: &str,
        category: &str,
    ) -> StoreResult<Committed<RecordId>> {
        self.check_new_entry(key, value)?;

        let now = self.clock.now();
        let id = self.state.insert(actor, key, value, category, now);
        let event = StoreEvent::Stored {
            id,
            key: key.to_string(),
            value: value.to_string(),
            actor: actor.clone(),
            timestamp: now,
        };
        Ok(Committed::new(id, vec![event]))
    }

    /// Store several records in one all-or-nothing batch.
    ///
    /// The whole batch is validated before the first record is written, so
    /// any rejection leaves the store and the id counter untouched.
    pub fn bulk_store(
        &mut self,
        actor: &ActorId,
        keys: &[String],
        values: &[String],
        category: &str,
    ) -> StoreResult<Committed<Vec<RecordId>>> {
        if keys.is_empty() {
            return Err(StoreError::InvalidArgument("bulk store requires at least one record".into()));
        }
        if keys.len() != values.len() {
            return Err(StoreError::InvalidArgument(format!(
                "got {} keys but {} values",
                keys.len(),
                values.len()
            )));
        }

        let mut batch_keys = HashSet::with_capacity(keys.len());
        for (key, value) in keys.iter().zip(values) {
            self.check_new_entry(key, value)?;
            if !batch_keys.insert(key.as_str()) {
                return Err(StoreError::KeyConflict(key.clone()));
            }
        }

        let now = self.clock.now();
        let mut ids = Vec::with_capacity(keys.len());
        let mut events = Vec::with_capacity(keys.len());
        for (key, value) in keys.iter().zip(values) {
            let id = self.state.insert(actor, key, value, category, now);
            ids.push(id);
            events.push(StoreEvent::Stored {
                id,
                key: key.clone(),
                value: value.clone(),
                actor: actor.clone(),
                timestamp: now,
            });
        }
        Ok(Committed::new(ids, events))
    }

    /// Replace the value of an active record and bump its version
    pub fn update(
        &mut self,
        actor: &ActorId,
        id: RecordId,
        new_value: &str,
    ) -> StoreResult<Committed<()>> {
        self.check_modifiable(actor, id)?;
        if new_value.is_empty() {
            return Err(StoreError::InvalidArgument("value must not be empty".into()));
        }

        let now = self.clock.now();
        let old_value = self.state.replace_value(id, new_value, now)?;
        let event = StoreEvent::Updated {
            id,
            old_value,
            new_value: new_value.to_string(),
            actor: actor.clone(),
            timestamp: now,
        };
        Ok(Committed::new((), vec![event]))
    }

    /// Soft-delete: the record and its key binding stay in place
    pub fn delete(&mut self, actor: &ActorId, id: RecordId) -> StoreResult<Committed<()>> {
        self.check_modifiable(actor, id)?;

        let now = self.clock.now();
        self.state.set_active(id, false, now)?;
        let event = StoreEvent::Deleted {
            id,
            actor: actor.clone(),
            timestamp: now,
        };
        Ok(Committed::new((), vec![event]))
    }

    /// Administrator only. Emits no event.
    pub fn reactivate(&mut self, actor: &ActorId, id: RecordId) -> StoreResult<Committed<()>> {
        self.require_administrator(actor)?;
        if self.state.record(id)?.active {
            return Err(StoreError::AlreadyActive(id));
        }

        let now = self.clock.now();
        self.state.set_active(id, true, now)?;
        Ok(Committed::silent(()))
    }

    /// Hand the administrator role to `new_admin`
    pub fn transfer_ownership(
        &mut self,
        actor: &ActorId,
        new_admin: &ActorId,
    ) -> StoreResult<Committed<()>> {
        self.require_administrator(actor)?;
        if new_admin.is_null() {
            return Err(StoreError::InvalidArgument("new administrator is the null identity".into()));
        }
        if self.state.is_administrator(new_admin) {
            return Err(StoreError::InvalidArgument(
                "new administrator is already the administrator".into(),
            ));
        }

        let now = self.clock.now();
        let previous_admin = self.state.set_administrator(new_admin.clone());
        let event = StoreEvent::OwnershipTransferred {
            previous_admin,
            new_admin: new_admin.clone(),
            timestamp: now,
        };
        Ok(Committed::new((), vec![event]))
    }

    // ==================
    // Queries
    // ==================

    /// Active record by id
    pub fn get(&self, id: RecordId) -> StoreResult<Record> {
        let record = self.state.record(id)?;
        if !record.active {
            return Err(StoreError::Inactive(id));
        }
        Ok(record.clone())
    }

    /// Active record by key
    pub fn get_by_key(&self, key: &str) -> StoreResult<Record> {
        let id = self
            .state
            .indexes()
            .id_for_key(key)
            .ok_or_else(|| StoreError::key_not_found(key))?;
        self.get(id)
    }

    /// Ids created by `actor`, inactive ones included
    pub fn user_records(&self, actor: &ActorId) -> Vec<RecordId> {
        self.state.indexes().by_creator(actor).to_vec()
    }

    pub fn records_by_category(&self, category: &str) -> Vec<RecordId> {
        self.state.indexes().by_category(category).to_vec()
    }

    /// Active ids in insertion order
    pub fn active_records(&self) -> Vec<RecordId> {
        self.state
            .iter()
            .filter(|r| r.active)
            .map(|r| r.id)
            .collect()
    }

    /// Every key ever bound, in insertion order
    pub fn all_keys(&self) -> Vec<String> {
        self.state.iter().map(|r| r.key.clone()).collect()
    }

    pub fn key_exists(&self, key: &str) -> KeyStatus {
        match self.state.indexes().id_for_key(key) {
            Some(id) => KeyStatus {
                exists: true,
                is_active: self.state.record(id).map(|r| r.active).unwrap_or(false),
            },
            None => KeyStatus::default(),
        }
    }

    pub fn total_records(&self) -> u64 {
        self.state.record_count()
    }

    pub fn active_record_count(&self) -> u64 {
        self.state.active_count()
    }

    /// Metadata for any record, active or not
    pub fn record_metadata(&self, id: RecordId) -> StoreResult<RecordMetadata> {
        Ok(self.state.record(id)?.metadata())
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            total_records: self.state.record_count(),
            active_records: self.state.active_count(),
            total_ids_tracked: self.state.indexes().all_ids().len() as u64,
            administrator: self.state.administrator().clone(),
            distinct_creators: self.state.indexes().distinct_creators() as u64,
        }
    }

    // ==================
    // Preconditions
    // ==================

    fn check_new_entry(&self, key: &str, value: &str) -> StoreResult<()> {
        if key.is_empty() {
            return Err(StoreError::InvalidArgument("key must not be empty".into()));
        }
        if value.is_empty() {
            return Err(StoreError::InvalidArgument("value must not be empty".into()));
        }
        if self.state.indexes().is_bound(key) {
            return Err(StoreError::KeyConflict(key.to_string()));
        }
        Ok(())
    }

    /// Exists, caller is creator or administrator, record is active
    fn check_modifiable(&self, actor: &ActorId, id: RecordId) -> StoreResult<()> {
        let record = self.state.record(id)?;
        if !self.state.may_modify(actor, record) {
            return Err(StoreError::Unauthorized(format!(
                "'{}' is neither creator nor administrator of record {}",
                actor, id
            )));
        }
        if !record.active {
            return Err(StoreError::Inactive(id));
        }
        Ok(())
    }

    fn require_administrator(&self, actor: &ActorId) -> StoreResult<()> {
        if !self.state.is_administrator(actor) {
            return Err(StoreError::Unauthorized(format!(
                "'{}' is not the administrator",
                actor
            )));
        }
        Ok(())
    }
}
