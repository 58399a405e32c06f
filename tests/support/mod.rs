//! Shared fixtures for secret service integration tests.
//!
//! - `FakeSecretStore` - in-memory store answering like the API server
//! - `RecordingMetrics` - metrics sink remembering every event
//! - `LogCapture` - tracing dispatcher writing into a buffer

#![allow(dead_code, reason = "Each test binary uses a different subset of fixtures")]

use std::collections::BTreeMap;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use kube::api::PostParams;
use kube::core::ErrorResponse;
use secret_service::observability::metrics::SecretMetrics;
use secret_service::{ErrorKind, Operation, SecretStore};
use tracing::Dispatch;
use tracing_subscriber::fmt::MakeWriter;

/// Failure injected into every store call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Connection refused before any response
    Transport,
    /// 403 from the API server
    Forbidden,
    /// 500 from the API server
    Internal,
    /// 404 for the namespace, as the API server answers a create into a missing namespace
    NamespaceMissing,
}

impl Failure {
    fn to_error(self) -> kube::Error {
        match self {
            Failure::Transport => kube::Error::Service(Box::new(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "tcp connect error: Connection refused",
            ))),
            Failure::Forbidden => api_error(
                403,
                "Forbidden",
                "secrets is forbidden: User \"system:serviceaccount:default:test\" cannot get resource \"secrets\"",
            ),
            Failure::Internal => api_error(500, "InternalError", "etcdserver: request timed out"),
            Failure::NamespaceMissing => {
                api_error(404, "NotFound", "namespaces \"missing\" not found")
            }
        }
    }
}

fn api_error(code: u16, reason: &str, message: &str) -> kube::Error {
    kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: message.to_string(),
        reason: reason.to_string(),
        code,
    })
}

/// In-memory secret store keyed by (namespace, name)
#[derive(Debug, Default)]
pub struct FakeSecretStore {
    secrets: Mutex<BTreeMap<(String, String), Secret>>,
    failure: Mutex<Option<Failure>>,
    /// Look secrets up by name only, ignoring the namespace (a misbehaving store)
    ignore_namespace: bool,
    /// Namespace reported back on create instead of the one written to
    echo_namespace: Option<String>,
    last_params: Mutex<Option<PostParams>>,
    get_calls: AtomicUsize,
    create_calls: AtomicUsize,
}

impl FakeSecretStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(failure: Failure) -> Arc<Self> {
        let store = Self::default();
        *store.failure.lock().unwrap() = Some(failure);
        Arc::new(store)
    }

    pub fn ignoring_namespace() -> Arc<Self> {
        Arc::new(Self {
            ignore_namespace: true,
            ..Self::default()
        })
    }

    pub fn echoing_namespace(namespace: &str) -> Arc<Self> {
        Arc::new(Self {
            echo_namespace: Some(namespace.to_string()),
            ..Self::default()
        })
    }

    /// Seed a secret directly, bypassing the service
    pub fn insert(&self, namespace: &str, name: &str, data: &[(&str, &[u8])]) {
        let secret = secret(namespace, name, data);
        self.secrets
            .lock()
            .unwrap()
            .insert((namespace.to_string(), name.to_string()), secret);
    }

    pub fn contains(&self, namespace: &str, name: &str) -> bool {
        self.secrets
            .lock()
            .unwrap()
            .contains_key(&(namespace.to_string(), name.to_string()))
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn last_params(&self) -> Option<PostParams> {
        self.last_params.lock().unwrap().clone()
    }
}

#[async_trait]
impl SecretStore for FakeSecretStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<Secret, kube::Error> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(failure) = *self.failure.lock().unwrap() {
            return Err(failure.to_error());
        }

        let secrets = self.secrets.lock().unwrap();
        let found = if self.ignore_namespace {
            secrets
                .iter()
                .find(|((_, n), _)| n == name)
                .map(|(_, secret)| secret.clone())
        } else {
            secrets
                .get(&(namespace.to_string(), name.to_string()))
                .cloned()
        };
        found.ok_or_else(|| {
            api_error(404, "NotFound", &format!("secrets \"{name}\" not found"))
        })
    }

    async fn create(
        &self,
        namespace: &str,
        secret: &Secret,
        params: &PostParams,
    ) -> Result<Secret, kube::Error> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_params.lock().unwrap() = Some(params.clone());
        if let Some(failure) = *self.failure.lock().unwrap() {
            return Err(failure.to_error());
        }

        let name = secret.metadata.name.clone().unwrap_or_default();
        let key = (namespace.to_string(), name.clone());
        let mut secrets = self.secrets.lock().unwrap();
        if secrets.contains_key(&key) {
            return Err(api_error(
                409,
                "AlreadyExists",
                &format!("secrets \"{name}\" already exists"),
            ));
        }

        let mut created = secret.clone();
        created.metadata.namespace = Some(namespace.to_string());
        created.metadata.resource_version = Some((secrets.len() + 1).to_string());
        if !params.dry_run {
            secrets.insert(key, created.clone());
        }
        if let Some(echo) = &self.echo_namespace {
            created.metadata.namespace = Some(echo.clone());
        }
        Ok(created)
    }
}

/// Build a Kubernetes secret object
pub fn secret(namespace: &str, name: &str, data: &[(&str, &[u8])]) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..ObjectMeta::default()
        },
        data: Some(
            data.iter()
                .map(|(key, value)| ((*key).to_string(), ByteString(value.to_vec())))
                .collect(),
        ),
        ..Secret::default()
    }
}

/// Metrics sink remembering events as `started:get`, `succeeded:get`, `failed:get:not_found`
#[derive(Debug, Default)]
pub struct RecordingMetrics {
    events: Mutex<Vec<String>>,
}

impl RecordingMetrics {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl SecretMetrics for RecordingMetrics {
    fn operation_started(&self, operation: Operation) {
        self.events
            .lock()
            .unwrap()
            .push(format!("started:{operation}"));
    }

    fn operation_succeeded(&self, operation: Operation, _elapsed: Duration) {
        self.events
            .lock()
            .unwrap()
            .push(format!("succeeded:{operation}"));
    }

    fn operation_failed(&self, operation: Operation, kind: ErrorKind, _elapsed: Duration) {
        self.events
            .lock()
            .unwrap()
            .push(format!("failed:{operation}:{kind}"));
    }
}

/// Tracing dispatcher writing plain-text logs into a shared buffer
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn dispatch(&self) -> Dispatch {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        Dispatch::new(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
