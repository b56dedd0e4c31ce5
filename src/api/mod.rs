//! API Layer for keyledger
//!
//! Translates JSON requests into record store operations behind a single
//! global lock. Every transport (stdin CLI, HTTP) goes through here.
//!
//! # Design Principles
//!
//! - Single global mutex for all operations
//! - Store error codes passed through unchanged
//! - Mutations are durable before they are acknowledged (when snapshots are on)
//! - Every mutation attempt is audited

mod errors;
mod handler;
mod request;
mod response;

pub use errors::{ApiError, ApiErrorCode, ApiResult, Severity};
pub use handler::ApiHandler;
pub use request::{Request, OPERATIONS};
pub use response::{ErrorResponse, Response, SuccessResponse};
