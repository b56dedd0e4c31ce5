//! API Handler for keyledger
//!
//! Owns the record store behind a single global mutex, so every request is
//! applied as one indivisible step relative to every other request.
//!
//! Flow per request:
//! 1. Acquire the global lock
//! 2. Dispatch to the store
//! 3. For committed mutations, write the snapshot (rolling back on failure)
//! 4. Count, log and audit the outcome
//! 5. Release the lock

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::{json, Value};

use crate::observability::{
    log_event_with_fields, AuditLog, AuditOutcome, AuditRecord, Event, Logger, MetricsRegistry,
};
use crate::snapshot::write_snapshot;
use crate::store::{RecordStore, StoreEvent, StoreStats};

use super::errors::{ApiError, ApiResult};
use super::request::Request;
use super::response::Response;

/// Result of a dispatched operation before it becomes a `Response`
struct Outcome {
    data: Value,
    events: Vec<StoreEvent>,
}

impl Outcome {
    fn query(data: Value) -> Self {
        Self {
            data,
            events: Vec::new(),
        }
    }
}

/// API Handler with global execution lock
pub struct ApiHandler {
    store: Mutex<RecordStore>,
    /// Data directory for snapshot-on-write, if enabled
    snapshot_dir: Option<PathBuf>,
    audit: Option<Arc<dyn AuditLog>>,
    metrics: Arc<MetricsRegistry>,
}

impl std::fmt::Debug for ApiHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiHandler")
            .field("snapshot_dir", &self.snapshot_dir)
            .finish_non_exhaustive()
    }
}

impl ApiHandler {
    pub fn new(store: RecordStore) -> Self {
        Self {
            store: Mutex::new(store),
            snapshot_dir: None,
            audit: None,
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }

    /// Persist a snapshot into `data_dir` after every committed mutation
    pub fn with_snapshots(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = Some(data_dir.into());
        self
    }

    pub fn with_audit_log(mut self, audit: Arc<dyn AuditLog>) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    fn lock_store(&self) -> MutexGuard<'_, RecordStore> {
        // Mutators validate before writing, so a poisoned store is consistent.
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Store-wide statistics
    pub fn stats(&self) -> StoreStats {
        self.lock_store().stats()
    }

    /// Handle a raw JSON request string
    pub fn handle(&self, json_request: &str) -> Response {
        match Request::parse(json_request) {
            Ok(request) => self.execute(request),
            Err(e) => self.invalid_request(e),
        }
    }

    /// Handle an already decoded JSON value
    pub fn handle_value(&self, value: Value) -> Response {
        match Request::from_value(value) {
            Ok(request) => self.execute(request),
            Err(e) => self.invalid_request(e),
        }
    }

    fn invalid_request(&self, err: ApiError) -> Response {
        self.metrics.increment_operations_rejected();
        Logger::warn(
            Event::RequestInvalid.as_str(),
            &[("code", err.code()), ("message", err.message())],
        );
        self.audit(
            AuditRecord::new("invalid", AuditOutcome::Failed).with_error(err.code(), err.message()),
        );
        Response::error(&err)
    }

    /// Execute a parsed request
    pub fn execute(&self, request: Request) -> Response {
        let mut store = self.lock_store();

        let result = if request.is_mutation() {
            self.execute_mutation(&mut store, &request)
        } else {
            dispatch(&mut store, &request)
        };
        drop(store);

        match result {
            Ok(outcome) => {
                self.record_success(&request, &outcome);
                Response::success(outcome.data, outcome.events)
            }
            Err(err) => {
                self.record_failure(&request, &err);
                Response::error(&err)
            }
        }
    }

    /// Apply a mutation and make it durable, or leave the store untouched
    fn execute_mutation(&self, store: &mut RecordStore, request: &Request) -> ApiResult<Outcome> {
        let Some(dir) = &self.snapshot_dir else {
            return dispatch(store, request);
        };

        let before = store.state().clone();
        let outcome = dispatch(store, request)?;

        if let Err(e) = write_snapshot(dir, store.state()) {
            store.replace_state(before);
            log_event_with_fields(
                if e.is_fatal() {
                    Event::SnapshotCorruption
                } else {
                    Event::SnapshotFailed
                },
                &[("error", &e.to_string())],
            );
            return Err(ApiError::persistence_failed(&e));
        }
        self.metrics.increment_snapshots_written();
        Ok(outcome)
    }

    fn record_success(&self, request: &Request, outcome: &Outcome) {
        let actor = request.actor().map(|a| a.as_str()).unwrap_or("");
        match request {
            Request::Store { .. } => {
                self.metrics.add_records_stored(1);
                self.log_mutation(Event::RecordStored, actor, &outcome.data["id"]);
            }
            Request::BulkStore { keys, .. } => {
                self.metrics.add_records_stored(keys.len() as u64);
                self.metrics.increment_bulk_batches();
                self.log_mutation(Event::RecordsBulkStored, actor, &outcome.data["ids"]);
            }
            Request::Update { .. } => {
                self.metrics.increment_records_updated();
                self.log_mutation(Event::RecordUpdated, actor, &outcome.data["id"]);
            }
            Request::Delete { .. } => {
                self.metrics.increment_records_deleted();
                self.log_mutation(Event::RecordDeleted, actor, &outcome.data["id"]);
            }
            Request::Reactivate { .. } => {
                self.metrics.increment_records_reactivated();
                self.log_mutation(Event::RecordReactivated, actor, &outcome.data["id"]);
            }
            Request::TransferOwnership { .. } => {
                self.metrics.increment_ownership_transfers();
                self.log_mutation(Event::OwnershipTransferred, actor, &outcome.data["administrator"]);
            }
            _ => self.metrics.increment_queries_served(),
        }

        if request.is_mutation() {
            self.audit(audit_record(request, AuditOutcome::Success));
        }
    }

    fn record_failure(&self, request: &Request, err: &ApiError) {
        self.metrics.increment_operations_rejected();
        let actor = request.actor().map(|a| a.as_str()).unwrap_or("");
        Logger::warn(
            Event::OperationRejected.as_str(),
            &[
                ("actor", actor),
                ("code", err.code()),
                ("op", request.op_name()),
            ],
        );

        if request.is_mutation() {
            let outcome = if err.is_rejection() {
                AuditOutcome::Rejected
            } else {
                AuditOutcome::Failed
            };
            self.audit(audit_record(request, outcome).with_error(err.code(), err.message()));
        }
    }

    fn log_mutation(&self, event: Event, actor: &str, target: &Value) {
        let target = match target {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        log_event_with_fields(event, &[("actor", actor), ("target", &target)]);
    }

    fn audit(&self, record: AuditRecord) {
        if let Some(audit) = &self.audit {
            if let Err(e) = audit.append(&record) {
                Logger::error("AUDIT_APPEND_FAILED", &[("error", &e.to_string())]);
            }
        }
    }
}

fn audit_record(request: &Request, outcome: AuditOutcome) -> AuditRecord {
    let mut record = AuditRecord::new(request.op_name(), outcome);
    if let Some(actor) = request.actor() {
        record = record.with_actor(actor.as_str());
    }
    if let Some(target) = request.target() {
        record = record.with_target(target);
    }
    record
}

/// Route a request to the matching store operation
fn dispatch(store: &mut RecordStore, request: &Request) -> ApiResult<Outcome> {
    let outcome = match request {
        Request::Store {
            actor,
            key,
            value,
            category,
        } => {
            let committed = store.store(actor, key, value, category)?;
            Outcome {
                data: json!({ "id": committed.value }),
                events: committed.events,
            }
        }
        Request::BulkStore {
            actor,
            keys,
            values,
            category,
        } => {
            let committed = store.bulk_store(actor, keys, values, category)?;
            Outcome {
                data: json!({ "ids": committed.value }),
                events: committed.events,
            }
        }
        Request::Update { actor, id, value } => {
            let committed = store.update(actor, *id, value)?;
            Outcome {
                data: json!({ "id": id }),
                events: committed.events,
            }
        }
        Request::Delete { actor, id } => {
            let committed = store.delete(actor, *id)?;
            Outcome {
                data: json!({ "id": id }),
                events: committed.events,
            }
        }
        Request::Reactivate { actor, id } => {
            let committed = store.reactivate(actor, *id)?;
            Outcome {
                data: json!({ "id": id }),
                events: committed.events,
            }
        }
        Request::TransferOwnership { actor, new_admin } => {
            let committed = store.transfer_ownership(actor, new_admin)?;
            Outcome {
                data: json!({ "administrator": new_admin }),
                events: committed.events,
            }
        }
        Request::Get { id } => Outcome::query(json!(store.get(*id)?)),
        Request::GetByKey { key } => Outcome::query(json!(store.get_by_key(key)?)),
        Request::UserRecords { actor } => Outcome::query(json!({ "ids": store.user_records(actor) })),
        Request::RecordsByCategory { category } => {
            Outcome::query(json!({ "ids": store.records_by_category(category) }))
        }
        Request::ActiveRecords => Outcome::query(json!({ "ids": store.active_records() })),
        Request::AllKeys => Outcome::query(json!({ "keys": store.all_keys() })),
        Request::KeyExists { key } => Outcome::query(json!(store.key_exists(key))),
        Request::TotalRecords => Outcome::query(json!({ "count": store.total_records() })),
        Request::ActiveRecordCount => {
            Outcome::query(json!({ "count": store.active_record_count() }))
        }
        Request::RecordMetadata { id } => Outcome::query(json!(store.record_metadata(*id)?)),
        Request::Stats => Outcome::query(json!(store.stats())),
    };
    Ok(outcome)
}
