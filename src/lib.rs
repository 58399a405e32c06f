//! # Secret Service
//!
//! Narrow access layer for Kubernetes `Secret` resources.
//!
//! Callers (controllers, reconcilers, CLIs) fetch and create secrets through
//! [`SecretService`] instead of talking to the API server directly. Every store
//! failure is classified into a small taxonomy ([`ErrorKind`]) so callers can
//! branch on "secret absent" or "already exists" without inspecting
//! `kube::Error` internals.
//!
//! ```no_run
//! # async fn run() -> anyhow::Result<()> {
//! use std::sync::Arc;
//! use secret_service::{observability::metrics::NoopMetrics, SecretService};
//!
//! let client = kube::Client::try_default().await?;
//! let service = SecretService::new(client, tracing::Dispatch::none(), Arc::new(NoopMetrics));
//!
//! match service.get_secret("default", "db-credentials").await {
//!     Ok(record) => println!("{} keys", record.data().len()),
//!     Err(e) if e.is_not_found() => println!("secret missing"),
//!     Err(e) => return Err(e.into()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod observability;
pub mod record;
pub mod service;
pub mod store;

pub use config::ServiceConfig;
pub use error::{is_conflict, is_not_found, ErrorKind, SecretError};
pub use record::{SecretRecord, SecretRef};
pub use service::{Operation, SecretService};
pub use store::SecretStore;
