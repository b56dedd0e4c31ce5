//! # keyledger HTTP Server Module
//!
//! Exposes the record store API over HTTP with axum.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/records`, `/keys`, `/creators`, `/categories`, `/active`, `/stats` - store API
//! - `/admin/transfer` - administrator handover
//! - `/observability/*` - Metrics and health

pub mod config;
pub mod observability_routes;
pub mod record_routes;
pub mod server;

pub use config::HttpServerConfig;
pub use record_routes::ACTOR_HEADER;
pub use server::HttpServer;
