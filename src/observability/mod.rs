//! # Observability
//!
//! Logging and metrics sinks for the secret service.
//!
//! ## Sub-modules
//!
//! - `logging` - Process-level tracing subscriber setup
//! - `metrics` - Metrics sink trait with Prometheus and no-op implementations

pub mod logging;
pub mod metrics;

pub use logging::init_tracing;
