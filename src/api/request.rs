//! API request types
//!
//! One JSON object per request, discriminated by `op`:
//!
//! ```json
//! {"op": "store", "actor": "alice", "key": "k1", "value": "v1", "category": "notes"}
//! {"op": "update", "actor": "alice", "id": 1, "value": "v2"}
//! {"op": "key_exists", "key": "k1"}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::{ActorId, RecordId};

use super::errors::{ApiError, ApiResult};

/// Every operation the API accepts
pub const OPERATIONS: &[&str] = &[
    "store",
    "bulk_store",
    "update",
    "get",
    "get_by_key",
    "delete",
    "reactivate",
    "transfer_ownership",
    "user_records",
    "records_by_category",
    "active_records",
    "all_keys",
    "key_exists",
    "total_records",
    "active_record_count",
    "record_metadata",
    "stats",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Store {
        actor: ActorId,
        key: String,
        value: String,
        #[serde(default)]
        category: String,
    },
    BulkStore {
        actor: ActorId,
        keys: Vec<String>,
        values: Vec<String>,
        #[serde(default)]
        category: String,
    },
    Update {
        actor: ActorId,
        id: RecordId,
        value: String,
    },
    Get {
        id: RecordId,
    },
    GetByKey {
        key: String,
    },
    Delete {
        actor: ActorId,
        id: RecordId,
    },
    Reactivate {
        actor: ActorId,
        id: RecordId,
    },
    TransferOwnership {
        actor: ActorId,
        new_admin: ActorId,
    },
    UserRecords {
        actor: ActorId,
    },
    RecordsByCategory {
        category: String,
    },
    ActiveRecords,
    AllKeys,
    KeyExists {
        key: String,
    },
    TotalRecords,
    ActiveRecordCount,
    RecordMetadata {
        id: RecordId,
    },
    Stats,
}

impl Request {
    /// Parse a request from a JSON string
    pub fn parse(json: &str) -> ApiResult<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| ApiError::invalid_request(format!("Invalid JSON: {}", e)))?;
        Self::from_value(value)
    }

    /// Parse a request from an already decoded JSON value
    pub fn from_value(value: Value) -> ApiResult<Self> {
        let op = value
            .get("op")
            .and_then(Value::as_str)
            .ok_or_else(|| ApiError::invalid_request("Missing op"))?;
        if !OPERATIONS.contains(&op) {
            return Err(ApiError::unknown_operation(op));
        }

        serde_json::from_value(value)
            .map_err(|e| ApiError::invalid_request(format!("Invalid request: {}", e)))
    }

    /// Operation name as it appears in `op`
    pub fn op_name(&self) -> &'static str {
        match self {
            Request::Store { .. } => "store",
            Request::BulkStore { .. } => "bulk_store",
            Request::Update { .. } => "update",
            Request::Get { .. } => "get",
            Request::GetByKey { .. } => "get_by_key",
            Request::Delete { .. } => "delete",
            Request::Reactivate { .. } => "reactivate",
            Request::TransferOwnership { .. } => "transfer_ownership",
            Request::UserRecords { .. } => "user_records",
            Request::RecordsByCategory { .. } => "records_by_category",
            Request::ActiveRecords => "active_records",
            Request::AllKeys => "all_keys",
            Request::KeyExists { .. } => "key_exists",
            Request::TotalRecords => "total_records",
            Request::ActiveRecordCount => "active_record_count",
            Request::RecordMetadata { .. } => "record_metadata",
            Request::Stats => "stats",
        }
    }

    /// True for operations that can change store state
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Request::Store { .. }
                | Request::BulkStore { .. }
                | Request::Update { .. }
                | Request::Delete { .. }
                | Request::Reactivate { .. }
                | Request::TransferOwnership { .. }
        )
    }

    /// Acting identity, for mutations and per-creator queries
    pub fn actor(&self) -> Option<&ActorId> {
        match self {
            Request::Store { actor, .. }
            | Request::BulkStore { actor, .. }
            | Request::Update { actor, .. }
            | Request::Delete { actor, .. }
            | Request::Reactivate { actor, .. }
            | Request::TransferOwnership { actor, .. }
            | Request::UserRecords { actor } => Some(actor),
            _ => None,
        }
    }

    /// Human readable target, for audit records
    pub fn target(&self) -> Option<String> {
        match self {
            Request::Store { key, .. } | Request::GetByKey { key } | Request::KeyExists { key } => {
                Some(key.clone())
            }
            Request::BulkStore { keys, .. } => Some(keys.join(",")),
            Request::Update { id, .. }
            | Request::Get { id }
            | Request::Delete { id, .. }
            | Request::Reactivate { id, .. }
            | Request::RecordMetadata { id } => Some(id.to_string()),
            Request::TransferOwnership { new_admin, .. } => Some(new_admin.to_string()),
            Request::RecordsByCategory { category } => Some(category.clone()),
            _ => None,
        }
    }
}
