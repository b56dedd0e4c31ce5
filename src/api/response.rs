//! API response types
//!
//! ```json
//! {"status":"ok","data":{"id":1},"events":[{"type":"STORED", ...}]}
//! {"status":"error","code":"KEYLEDGER_KEY_CONFLICT","message":"..."}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::StoreEvent;

use super::errors::ApiError;

/// Success response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub status: String,
    pub data: Value,
    /// Events emitted by the operation, in emission order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<StoreEvent>,
}

impl SuccessResponse {
    pub fn new(data: Value, events: Vec<StoreEvent>) -> Self {
        Self {
            status: "ok".to_string(),
            data,
            events,
        }
    }
}

/// Error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub code: String,
    pub message: String,
    #[serde(skip)]
    pub http_status: u16,
}

impl ErrorResponse {
    pub fn from_error(err: &ApiError) -> Self {
        Self {
            status: "error".to_string(),
            code: err.code().to_string(),
            message: err.message().to_string(),
            http_status: err.status_code(),
        }
    }
}

/// Unified response type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Success(SuccessResponse),
    Error(ErrorResponse),
}

impl Response {
    pub fn success(data: Value, events: Vec<StoreEvent>) -> Self {
        Response::Success(SuccessResponse::new(data, events))
    }

    pub fn error(err: &ApiError) -> Self {
        Response::Error(ErrorResponse::from_error(err))
    }

    /// Convert to a single-line JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                r#"{{"status":"error","code":"KEYLEDGER_INTERNAL","message":"response encoding failed: {}"}}"#,
                e.to_string().replace('"', "'")
            )
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success(_))
    }

    /// HTTP status an adapter should use for this response
    pub fn status_code(&self) -> u16 {
        match self {
            Response::Success(_) => 200,
            Response::Error(e) => e.http_status,
        }
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            Response::Success(s) => Some(&s.data),
            Response::Error(_) => None,
        }
    }

    pub fn events(&self) -> &[StoreEvent] {
        match self {
            Response::Success(s) => &s.events,
            Response::Error(_) => &[],
        }
    }

    pub fn error_code(&self) -> Option<&str> {
        match self {
            Response::Success(_) => None,
            Response::Error(e) => Some(&e.code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_response_without_events() {
        let json = Response::success(json!({"count": 3}), Vec::new()).to_json();
        assert_eq!(json, r#"{"status":"ok","data":{"count":3}}"#);
    }

    #[test]
    fn test_error_response() {
        let resp = Response::error(&ApiError::invalid_request("test error"));
        let json = resp.to_json();
        assert!(json.contains("\"status\":\"error\""));
        assert!(json.contains("KEYLEDGER_INVALID_REQUEST"));
        assert!(!json.contains("http_status"));
        assert_eq!(resp.status_code(), 400);
        assert!(!resp.is_success());
    }
}
