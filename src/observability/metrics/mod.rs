//! # Metrics Module
//!
//! Metrics sink consumed by the secret service.
//!
//! The service reports three events per operation: the attempt, then either success or
//! failure (with the error classification). Sinks must be cheap and must not fail.
//!
//! - `prometheus_metrics` - Prometheus counters/histograms registered into a caller registry
//! - [`NoopMetrics`] - discards everything

mod prometheus_metrics;

pub use prometheus_metrics::PrometheusMetrics;

use std::time::Duration;

use crate::error::ErrorKind;
use crate::service::Operation;

/// Metrics sink for secret operations
pub trait SecretMetrics: Send + Sync {
    /// An operation is about to hit the store
    fn operation_started(&self, operation: Operation);

    /// The operation completed and returned a record
    fn operation_succeeded(&self, operation: Operation, elapsed: Duration);

    /// The operation failed with an error of the given kind
    fn operation_failed(&self, operation: Operation, kind: ErrorKind, elapsed: Duration);
}

/// Metrics sink that records nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl SecretMetrics for NoopMetrics {
    fn operation_started(&self, _operation: Operation) {}

    fn operation_succeeded(&self, _operation: Operation, _elapsed: Duration) {}

    fn operation_failed(&self, _operation: Operation, _kind: ErrorKind, _elapsed: Duration) {}
}
