//! # Secret Service
//!
//! Read and create Kubernetes secrets through an injected store, logger and metrics sink.
//!
//! Each call is exactly one store round-trip: no retries, no caching, no upserts.
//! Store failures are classified by [`crate::error::classify`] before they reach the
//! caller, so `SecretError::is_not_found` is the only check a caller needs to tell an
//! absent secret from a broken cluster connection.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use kube::Client;
use tracing::instrument::WithSubscriber;
use tracing::{debug, error, info, info_span, warn, Dispatch, Instrument, Span};

use crate::config::ServiceConfig;
use crate::error::{classify, classify_create, ErrorKind, SecretError};
use crate::observability::metrics::SecretMetrics;
use crate::record::{SecretRecord, SecretRef};
use crate::store::SecretStore;

/// Operations exposed by the service, used as metric and span labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Get,
    Create,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Get => "get",
            Operation::Create => "create",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access layer for Kubernetes secrets
///
/// Safe to share between tasks (`Arc<SecretService>` or `clone()`) as long as the store is;
/// the service itself holds no mutable state.
#[derive(Clone)]
pub struct SecretService<S = Client> {
    store: S,
    logger: Dispatch,
    metrics: Arc<dyn SecretMetrics>,
    config: ServiceConfig,
}

impl<S> fmt::Debug for SecretService<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<S: SecretStore> SecretService<S> {
    /// Create a service from already-configured collaborators
    ///
    /// `logger` receives every span and event the service emits; pass
    /// `Dispatch::none()` to discard them or `tracing::dispatcher::get_default(Dispatch::clone)`
    /// to log into the process-wide subscriber.
    pub fn new(store: S, logger: Dispatch, metrics: Arc<dyn SecretMetrics>) -> Self {
        Self {
            store,
            logger,
            metrics,
            config: ServiceConfig::default(),
        }
    }

    /// Replace the default configuration
    #[must_use]
    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Fetch the secret `name` in `namespace`
    ///
    /// # Errors
    ///
    /// - [`SecretError::NotFound`] if the store has no such secret
    /// - [`SecretError::IdentityMismatch`] if the store answers with a different object
    /// - [`SecretError::Store`] for any other store failure
    pub async fn get_secret(&self, namespace: &str, name: &str) -> Result<SecretRecord, SecretError> {
        let secret = SecretRef::new(namespace, name);
        let request = async {
            let object = self
                .store
                .get(namespace, name)
                .await
                .map_err(|e| classify(secret.clone(), e))?;
            SecretRecord::from_store(&secret, object)
        };
        self.run(Operation::Get, &secret, request).await
    }

    /// Create `record` in the store
    ///
    /// Returns the record as accepted by the store, under the requested identity. An
    /// existing secret with the same identity is never overwritten.
    ///
    /// # Errors
    ///
    /// - [`SecretError::Conflict`] if the secret already exists
    /// - [`SecretError::Store`] for any other store failure, including a missing namespace
    pub async fn create_secret(&self, record: &SecretRecord) -> Result<SecretRecord, SecretError> {
        let secret = record.secret_ref().clone();
        let request = async {
            let object = record.to_secret();
            let params = self.config.post_params();
            let created = self
                .store
                .create(&secret.namespace, &object, &params)
                .await
                .map_err(|e| classify_create(secret.clone(), e))?;
            Ok(SecretRecord::accepted(&secret, created))
        };
        self.run(Operation::Create, &secret, request).await
    }

    /// Run one store request inside the injected dispatcher, recording logs and metrics
    async fn run<F>(
        &self,
        operation: Operation,
        secret: &SecretRef,
        request: F,
    ) -> Result<SecretRecord, SecretError>
    where
        F: Future<Output = Result<SecretRecord, SecretError>>,
    {
        let span = tracing::dispatcher::with_default(&self.logger, || operation_span(operation, secret));

        async move {
            debug!("{} secret {}", operation, secret);
            self.metrics.operation_started(operation);
            let start = Instant::now();

            let result = request.await;

            let elapsed = start.elapsed();
            let span = Span::current();
            span.record("operation.duration_ms", elapsed.as_millis() as u64);
            match &result {
                Ok(record) => {
                    span.record("operation.success", true);
                    self.metrics.operation_succeeded(operation, elapsed);
                    info!(
                        keys = record.data().len(),
                        "{} secret {} succeeded", operation, secret
                    );
                }
                Err(e) => {
                    let kind = e.kind();
                    span.record("operation.success", false);
                    span.record("error.kind", kind.as_str());
                    self.metrics.operation_failed(operation, kind, elapsed);
                    match kind {
                        ErrorKind::NotFound => info!("Secret {} not found", secret),
                        ErrorKind::Conflict => warn!("Secret {} already exists", secret),
                        ErrorKind::Other => {
                            error!(error = %e, "{} secret {} failed", operation, secret);
                        }
                    }
                }
            }
            result
        }
        .instrument(span)
        .with_subscriber(self.logger.clone())
        .await
    }
}

fn operation_span(operation: Operation, secret: &SecretRef) -> Span {
    match operation {
        Operation::Get => info_span!(
            "secret.get",
            secret.namespace = %secret.namespace,
            secret.name = %secret.name,
            operation = operation.as_str(),
            operation.success = tracing::field::Empty,
            operation.duration_ms = tracing::field::Empty,
            error.kind = tracing::field::Empty,
        ),
        Operation::Create => info_span!(
            "secret.create",
            secret.namespace = %secret.namespace,
            secret.name = %secret.name,
            operation = operation.as_str(),
            operation.success = tracing::field::Empty,
            operation.duration_ms = tracing::field::Empty,
            error.kind = tracing::field::Empty,
        ),
    }
}
