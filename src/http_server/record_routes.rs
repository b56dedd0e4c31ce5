//! Record HTTP Routes
//!
//! Thin adapter from HTTP to `ApiHandler`. The acting identity is taken
//! from the `x-actor` header, which an upstream gateway is expected to have
//! authenticated.
//!
//! `ApiHandler::execute` blocks on the store mutex and may fsync a snapshot,
//! so every call runs on tokio's blocking pool.

use std::sync::Arc;

use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;

use crate::api::{ApiError, ApiHandler, Request, Response};
use crate::store::{ActorId, RecordId};

/// Header carrying the authenticated actor identity
pub const ACTOR_HEADER: &str = "x-actor";

type Reply = (StatusCode, Json<Value>);

// ==================
// Request Bodies
// ==================

#[derive(Debug, Deserialize)]
pub struct StoreBody {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Deserialize)]
pub struct BulkStoreBody {
    pub keys: Vec<String>,
    pub values: Vec<String>,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct TransferBody {
    pub new_admin: ActorId,
}

// ==================
// Routes
// ==================

/// Create record routes
pub fn record_routes(api: Arc<ApiHandler>) -> Router {
    Router::new()
        .route("/records", post(store_handler))
        .route("/records/bulk", post(bulk_store_handler))
        .route(
            "/records/:id",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
        .route("/records/:id/reactivate", post(reactivate_handler))
        .route("/records/:id/metadata", get(metadata_handler))
        .route("/keys", get(all_keys_handler))
        .route("/keys/:key", get(get_by_key_handler))
        .route("/keys/:key/exists", get(key_exists_handler))
        .route("/creators/:actor/records", get(user_records_handler))
        .route("/categories/:category/records", get(category_records_handler))
        .route("/active", get(active_records_handler))
        .route("/stats", get(stats_handler))
        .route("/stats/total", get(total_records_handler))
        .route("/stats/active", get(active_count_handler))
        .route("/admin/transfer", post(transfer_handler))
        .with_state(api)
}

// ==================
// Helpers
// ==================

fn reply(response: Response) -> Reply {
    let status =
        StatusCode::from_u16(response.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = serde_json::to_value(&response).unwrap_or(Value::Null);
    (status, Json(body))
}

fn actor_from(headers: &HeaderMap) -> Result<ActorId, Reply> {
    headers
        .get(ACTOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(ActorId::new)
        .ok_or_else(|| {
            reply(Response::error(&ApiError::invalid_request(format!(
                "Missing {} header",
                ACTOR_HEADER
            ))))
        })
}

fn record_id(path: Result<Path<RecordId>, PathRejection>) -> Result<RecordId, Reply> {
    path.map(|Path(id)| id).map_err(|rejection| {
        reply(Response::error(&ApiError::invalid_request(format!(
            "Invalid record id: {}",
            rejection.body_text()
        ))))
    })
}

async fn run(api: Arc<ApiHandler>, request: Request) -> Reply {
    match tokio::task::spawn_blocking(move || api.execute(request)).await {
        Ok(response) => reply(response),
        Err(e) => reply(Response::error(&ApiError::internal(format!(
            "Request task failed: {}",
            e
        )))),
    }
}

// ==================
// Mutation Handlers
// ==================

async fn store_handler(
    State(api): State<Arc<ApiHandler>>,
    headers: HeaderMap,
    Json(body): Json<StoreBody>,
) -> Reply {
    let actor = match actor_from(&headers) {
        Ok(actor) => actor,
        Err(r) => return r,
    };
    let (status, json) = run(
        api,
        Request::Store {
            actor,
            key: body.key,
            value: body.value,
            category: body.category,
        },
    )
    .await;
    // New records answer 201
    if status == StatusCode::OK {
        (StatusCode::CREATED, json)
    } else {
        (status, json)
    }
}

async fn bulk_store_handler(
    State(api): State<Arc<ApiHandler>>,
    headers: HeaderMap,
    Json(body): Json<BulkStoreBody>,
) -> Reply {
    let actor = match actor_from(&headers) {
        Ok(actor) => actor,
        Err(r) => return r,
    };
    run(
        api,
        Request::BulkStore {
            actor,
            keys: body.keys,
            values: body.values,
            category: body.category,
        },
    )
    .await
}

async fn update_handler(
    State(api): State<Arc<ApiHandler>>,
    id: Result<Path<RecordId>, PathRejection>,
    headers: HeaderMap,
    Json(body): Json<UpdateBody>,
) -> Reply {
    let id = match record_id(id) {
        Ok(id) => id,
        Err(r) => return r,
    };
    let actor = match actor_from(&headers) {
        Ok(actor) => actor,
        Err(r) => return r,
    };
    run(
        api,
        Request::Update {
            actor,
            id,
            value: body.value,
        },
    )
    .await
}

async fn delete_handler(
    State(api): State<Arc<ApiHandler>>,
    id: Result<Path<RecordId>, PathRejection>,
    headers: HeaderMap,
) -> Reply {
    let id = match record_id(id) {
        Ok(id) => id,
        Err(r) => return r,
    };
    let actor = match actor_from(&headers) {
        Ok(actor) => actor,
        Err(r) => return r,
    };
    run(api, Request::Delete { actor, id }).await
}

async fn reactivate_handler(
    State(api): State<Arc<ApiHandler>>,
    id: Result<Path<RecordId>, PathRejection>,
    headers: HeaderMap,
) -> Reply {
    let id = match record_id(id) {
        Ok(id) => id,
        Err(r) => return r,
    };
    let actor = match actor_from(&headers) {
        Ok(actor) => actor,
        Err(r) => return r,
    };
    run(api, Request::Reactivate { actor, id }).await
}

async fn transfer_handler(
    State(api): State<Arc<ApiHandler>>,
    headers: HeaderMap,
    Json(body): Json<TransferBody>,
) -> Reply {
    let actor = match actor_from(&headers) {
        Ok(actor) => actor,
        Err(r) => return r,
    };
    run(
        api,
        Request::TransferOwnership {
            actor,
            new_admin: body.new_admin,
        },
    )
    .await
}

// ==================
// Query Handlers
// ==================

async fn get_handler(
    State(api): State<Arc<ApiHandler>>,
    id: Result<Path<RecordId>, PathRejection>,
) -> Reply {
    let id = match record_id(id) {
        Ok(id) => id,
        Err(r) => return r,
    };
    run(api, Request::Get { id }).await
}

async fn metadata_handler(
    State(api): State<Arc<ApiHandler>>,
    id: Result<Path<RecordId>, PathRejection>,
) -> Reply {
    let id = match record_id(id) {
        Ok(id) => id,
        Err(r) => return r,
    };
    run(api, Request::RecordMetadata { id }).await
}

async fn get_by_key_handler(State(api): State<Arc<ApiHandler>>, Path(key): Path<String>) -> Reply {
    run(api, Request::GetByKey { key }).await
}

async fn key_exists_handler(State(api): State<Arc<ApiHandler>>, Path(key): Path<String>) -> Reply {
    run(api, Request::KeyExists { key }).await
}

async fn all_keys_handler(State(api): State<Arc<ApiHandler>>) -> Reply {
    run(api, Request::AllKeys).await
}

async fn user_records_handler(
    State(api): State<Arc<ApiHandler>>,
    Path(actor): Path<String>,
) -> Reply {
    run(
        api,
        Request::UserRecords {
            actor: ActorId::new(actor),
        },
    )
    .await
}

async fn category_records_handler(
    State(api): State<Arc<ApiHandler>>,
    Path(category): Path<String>,
) -> Reply {
    run(api, Request::RecordsByCategory { category }).await
}

async fn active_records_handler(State(api): State<Arc<ApiHandler>>) -> Reply {
    run(api, Request::ActiveRecords).await
}

async fn stats_handler(State(api): State<Arc<ApiHandler>>) -> Reply {
    run(api, Request::Stats).await
}

async fn total_records_handler(State(api): State<Arc<ApiHandler>>) -> Reply {
    run(api, Request::TotalRecords).await
}

async fn active_count_handler(State(api): State<Arc<ApiHandler>>) -> Reply {
    run(api, Request::ActiveRecordCount).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request as HttpRequest;
    use tower::ServiceExt;

    use crate::store::RecordStore;

    fn router() -> Router {
        let api = Arc::new(ApiHandler::new(RecordStore::new(ActorId::new("admin"))));
        record_routes(api)
    }

    async fn send(router: &Router, request: HttpRequest<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, actor: Option<&str>, body: Value) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(actor) = actor {
            builder = builder.header(ACTOR_HEADER, actor);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get(uri: &str) -> HttpRequest<Body> {
        HttpRequest::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_store_and_fetch() {
        let router = router();
        let (status, body) = send(
            &router,
            post_json("/records", Some("u"), serde_json::json!({"key": "k1", "value": "v1"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["id"], 1);
        assert_eq!(body["events"][0]["type"], "STORED");

        let (status, body) = send(&router, get("/records/1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["key"], "k1");

        let (status, body) = send(&router, get("/keys/k1/exists")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["is_active"], true);
    }

    #[tokio::test]
    async fn test_missing_actor_header() {
        let router = router();
        let (status, body) = send(
            &router,
            post_json("/records", None, serde_json::json!({"key": "k", "value": "v"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "KEYLEDGER_INVALID_REQUEST");
    }

    #[tokio::test]
    async fn test_unknown_record_is_404() {
        let router = router();
        let (status, body) = send(&router, get("/records/42")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "KEYLEDGER_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_delete_by_stranger_is_forbidden() {
        let router = router();
        send(
            &router,
            post_json("/records", Some("u"), serde_json::json!({"key": "k", "value": "v"})),
        )
        .await;

        let request = HttpRequest::builder()
            .method("DELETE")
            .uri("/records/1")
            .header(ACTOR_HEADER, "stranger")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&router, request).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (_, body) = send(&router, get("/stats/active")).await;
        assert_eq!(body["data"]["count"], 1);
    }

    #[tokio::test]
    async fn test_non_numeric_id_gets_json_error() {
        let router = router();
        let (status, body) = send(&router, get("/records/abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
        assert_eq!(body["code"], "KEYLEDGER_INVALID_REQUEST");

        let request = HttpRequest::builder()
            .method("DELETE")
            .uri("/records/-1")
            .header(ACTOR_HEADER, "u")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "KEYLEDGER_INVALID_REQUEST");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_stores_get_distinct_ids() {
        let router = router();
        let mut tasks = Vec::new();
        for i in 0..32 {
            let router = router.clone();
            tasks.push(tokio::spawn(async move {
                let request = post_json(
                    "/records",
                    Some("u"),
                    serde_json::json!({"key": format!("k{}", i), "value": "v"}),
                );
                let (status, body) = send(&router, request).await;
                assert_eq!(status, StatusCode::CREATED);
                body["data"]["id"].as_u64().unwrap()
            }));
        }

        let mut ids = Vec::new();
        for task in tasks {
            ids.push(task.await.unwrap());
        }
        ids.sort_unstable();
        assert_eq!(ids, (1..=32).collect::<Vec<u64>>());

        let (_, body) = send(&router, get("/stats/active")).await;
        assert_eq!(body["data"]["count"], 32);
    }

    #[tokio::test]
    async fn test_bulk_store_conflict_rejects_batch() {
        let router = router();
        let (status, body) = send(
            &router,
            post_json(
                "/records/bulk",
                Some("u"),
                serde_json::json!({"keys": ["a", "b", "a"], "values": ["1", "2", "3"]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "KEYLEDGER_KEY_CONFLICT");

        let (_, body) = send(&router, get("/stats/total")).await;
        assert_eq!(body["data"]["count"], 0);
    }
}
