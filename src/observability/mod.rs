//! Observability for the relay
//!
//! Structured logging and a process-wide metrics collector. Metrics are
//! exported on the HTTP health endpoint.

pub mod logging;
pub mod metrics;

// Re-export for convenience
pub use logging::{init_default_logging, init_logging, LogFormat};
pub use metrics::{metrics, MetricsCollector, MetricsSnapshot};

// Span macros for structured logging
pub use logging::{archive_span, request_span};
