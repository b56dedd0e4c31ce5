//! Record indexes
//!
//! All indexes are append-only. A key, once bound, keeps its id for the
//! lifetime of the store; deactivation never touches an index.
//!
//! - `key_index`: key -> id
//! - `creator_index`: creator -> ids, insertion order
//! - `category_index`: category -> ids, insertion order (non-empty categories only)
//! - `all_ids`: every id, insertion order

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::record::{ActorId, Record, RecordId};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordIndexes {
    key_index: BTreeMap<String, RecordId>,
    creator_index: BTreeMap<ActorId, Vec<RecordId>>,
    category_index: BTreeMap<String, Vec<RecordId>>,
    all_ids: Vec<RecordId>,
}

impl RecordIndexes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a freshly created record
    pub fn insert(&mut self, record: &Record) {
        self.key_index.insert(record.key.clone(), record.id);
        self.creator_index
            .entry(record.creator.clone())
            .or_default()
            .push(record.id);
        if !record.is_uncategorized() {
            self.category_index
                .entry(record.category.clone())
                .or_default()
                .push(record.id);
        }
        self.all_ids.push(record.id);
    }

    pub fn id_for_key(&self, key: &str) -> Option<RecordId> {
        self.key_index.get(key).copied()
    }

    pub fn is_bound(&self, key: &str) -> bool {
        self.key_index.contains_key(key)
    }

    pub fn by_creator(&self, creator: &ActorId) -> &[RecordId] {
        self.creator_index
            .get(creator)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn by_category(&self, category: &str) -> &[RecordId] {
        self.category_index
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn all_ids(&self) -> &[RecordId] {
        &self.all_ids
    }

    pub fn bound_keys(&self) -> usize {
        self.key_index.len()
    }

    pub fn distinct_creators(&self) -> usize {
        self.creator_index.len()
    }

    pub(crate) fn key_entries(&self) -> impl Iterator<Item = (&String, &RecordId)> {
        self.key_index.iter()
    }

    pub(crate) fn creator_entries(&self) -> impl Iterator<Item = (&ActorId, &Vec<RecordId>)> {
        self.creator_index.iter()
    }

    pub(crate) fn category_entries(&self) -> impl Iterator<Item = (&String, &Vec<RecordId>)> {
        self.category_index.iter()
    }
}
