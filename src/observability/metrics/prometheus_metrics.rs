//! # Prometheus Metrics
//!
//! Prometheus implementation of the secret metrics sink.

use std::time::Duration;

use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};

use super::SecretMetrics;
use crate::error::ErrorKind;
use crate::service::Operation;

/// Prometheus-backed metrics sink
///
/// Metrics are registered into the registry passed to [`PrometheusMetrics::new`], so a
/// process can expose them next to its own metrics. Cloning shares the underlying
/// collectors (Prometheus metrics are `Arc`-backed).
#[derive(Debug, Clone)]
pub struct PrometheusMetrics {
    operations_total: IntCounterVec,
    operation_errors_total: IntCounterVec,
    operation_duration: HistogramVec,
}

impl PrometheusMetrics {
    /// Create the collectors and register them with `registry`
    ///
    /// # Errors
    ///
    /// Returns an error if a collector with the same name is already registered.
    pub fn new(registry: &Registry) -> prometheus::Result<Self> {
        let operations_total = IntCounterVec::new(
            Opts::new(
                "secret_service_operations_total",
                "Total number of secret store operations attempted",
            ),
            &["operation"],
        )?;
        let operation_errors_total = IntCounterVec::new(
            Opts::new(
                "secret_service_operation_errors_total",
                "Total number of failed secret store operations by error kind",
            ),
            &["operation", "kind"],
        )?;
        let operation_duration = HistogramVec::new(
            HistogramOpts::new(
                "secret_service_operation_duration_seconds",
                "Duration of secret store operations in seconds",
            )
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
            &["operation", "outcome"],
        )?;

        registry.register(Box::new(operations_total.clone()))?;
        registry.register(Box::new(operation_errors_total.clone()))?;
        registry.register(Box::new(operation_duration.clone()))?;

        Ok(Self {
            operations_total,
            operation_errors_total,
            operation_duration,
        })
    }
}

impl SecretMetrics for PrometheusMetrics {
    fn operation_started(&self, operation: Operation) {
        self.operations_total
            .with_label_values(&[operation.as_str()])
            .inc();
    }

    fn operation_succeeded(&self, operation: Operation, elapsed: Duration) {
        self.operation_duration
            .with_label_values(&[operation.as_str(), "success"])
            .observe(elapsed.as_secs_f64());
    }

    fn operation_failed(&self, operation: Operation, kind: ErrorKind, elapsed: Duration) {
        self.operation_errors_total
            .with_label_values(&[operation.as_str(), kind.as_str()])
            .inc();
        self.operation_duration
            .with_label_values(&[operation.as_str(), "error"])
            .observe(elapsed.as_secs_f64());
    }
}
