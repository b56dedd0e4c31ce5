//! # HTTP Server
//!
//! Combines the record and observability routers behind one CORS layer.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::config::HttpServerConfig;
use super::observability_routes::observability_routes;
use super::record_routes::record_routes;
use crate::api::ApiHandler;
use crate::observability::{log_event_with_fields, Event};

/// HTTP server for a keyledger store
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server for `api` with default configuration
    pub fn new(api: Arc<ApiHandler>) -> Self {
        Self::with_config(api, HttpServerConfig::default())
    }

    /// Create a server for `api` with custom configuration
    pub fn with_config(api: Arc<ApiHandler>, config: HttpServerConfig) -> Self {
        let router = Self::build_router(api, &config);
        Self { config, router }
    }

    fn build_router(api: Arc<ApiHandler>, config: &HttpServerConfig) -> Router {
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .merge(observability_routes(api.clone()))
            .merge(record_routes(api.clone()))
            .nest("/observability", observability_routes(api))
            .layer(cors)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Start the HTTP server (async)
    pub async fn start(self) -> Result<(), io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid socket address {}: {}", self.config.socket_addr(), e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        log_event_with_fields(Event::Serving, &[("addr", &addr.to_string())]);
        axum::serve(listener, self.router).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::store::{ActorId, RecordStore};

    fn server() -> HttpServer {
        let api = Arc::new(ApiHandler::new(RecordStore::new(ActorId::new("admin"))));
        HttpServer::new(api)
    }

    #[test]
    fn test_socket_addr() {
        let api = Arc::new(ApiHandler::new(RecordStore::new(ActorId::new("admin"))));
        let server = HttpServer::with_config(api, HttpServerConfig::with_port(9999));
        assert_eq!(server.socket_addr(), "127.0.0.1:9999");
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = server()
            .router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_metrics_reflect_store_activity() {
        let router = server().router();
        let request = Request::builder()
            .method("POST")
            .uri("/records")
            .header("content-type", "application/json")
            .header("x-actor", "u")
            .body(Body::from(r#"{"key":"k","value":"v"}"#))
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/observability/metrics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let metrics: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(metrics["records_stored"], 1);
    }
}
