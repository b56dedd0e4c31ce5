//! keyledger - a versioned key-value record store
//!
//! Records are created under unique keys, owned by their creator, edited by
//! the creator or the store administrator, and soft-deleted. Nothing is
//! ever physically removed; ids and key bindings are permanent.
//!
//! Layers, bottom up:
//! - `store`: the in-memory engine and its invariants
//! - `snapshot`: checksummed on-disk state
//! - `observability`: logging, metrics, audit
//! - `api`: JSON request dispatch behind a global lock
//! - `cli` and `http_server`: transports

pub mod api;
pub mod cli;
pub mod http_server;
pub mod observability;
pub mod snapshot;
pub mod store;
