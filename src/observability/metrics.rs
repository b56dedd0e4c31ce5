//! Metrics registry
//!
//! Counters only, monotonic, reset on process start. Relaxed ordering is
//! enough: counters are observational and never drive store behavior.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct MetricsRegistry {
    records_stored: AtomicU64,
    records_updated: AtomicU64,
    records_deleted: AtomicU64,
    records_reactivated: AtomicU64,
    bulk_batches: AtomicU64,
    ownership_transfers: AtomicU64,
    operations_rejected: AtomicU64,
    queries_served: AtomicU64,
    snapshots_written: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_records_stored(&self, count: u64) {
        self.records_stored.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_records_updated(&self) {
        self.records_updated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_records_deleted(&self) {
        self.records_deleted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_records_reactivated(&self) {
        self.records_reactivated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_bulk_batches(&self) {
        self.bulk_batches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_ownership_transfers(&self) {
        self.ownership_transfers.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_operations_rejected(&self) {
        self.operations_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_queries_served(&self) {
        self.queries_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_snapshots_written(&self) {
        self.snapshots_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_stored: self.records_stored.load(Ordering::Relaxed),
            records_updated: self.records_updated.load(Ordering::Relaxed),
            records_deleted: self.records_deleted.load(Ordering::Relaxed),
            records_reactivated: self.records_reactivated.load(Ordering::Relaxed),
            bulk_batches: self.bulk_batches.load(Ordering::Relaxed),
            ownership_transfers: self.ownership_transfers.load(Ordering::Relaxed),
            operations_rejected: self.operations_rejected.load(Ordering::Relaxed),
            queries_served: self.queries_served.load(Ordering::Relaxed),
            snapshots_written: self.snapshots_written.load(Ordering::Relaxed),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self.snapshot()).unwrap_or(serde_json::Value::Null)
    }
}

/// A point-in-time copy of all counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub records_stored: u64,
    pub records_updated: u64,
    pub records_deleted: u64,
    pub records_reactivated: u64,
    pub bulk_batches: u64,
    pub ownership_transfers: u64,
    pub operations_rejected: u64,
    pub queries_served: u64,
    pub snapshots_written: u64,
}
