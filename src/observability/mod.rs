//! Observability subsystem for keyledger
//!
//! - Structured JSON logging
//! - Operation counters
//! - Lifecycle events
//! - Append-only audit log of every mutation attempt
//!
//! Observability is read-only with respect to the store: a logging or
//! metrics failure never changes the outcome of an operation.
//!
//! # Usage
//!
//! ```
//! use keyledger::observability::{Logger, MetricsRegistry};
//!
//! Logger::info("RECORD_STORED", &[("id", "42")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_records_updated();
//! assert_eq!(metrics.snapshot().records_updated, 1);
//! ```

mod audit;
mod events;
mod logger;
mod metrics;

pub use audit::{AuditLog, AuditOutcome, AuditRecord, FileAuditLog, MemoryAuditLog};
pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

fn severity_for(event: Event) -> Severity {
    if event.is_fatal() {
        Severity::Fatal
    } else {
        Severity::Info
    }
}

/// Log a lifecycle event
pub fn log_event(event: Event) {
    Logger::log(severity_for(event), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(severity_for(event), event.as_str(), fields);
}
