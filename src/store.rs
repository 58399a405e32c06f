//! # Secret Store
//!
//! Abstract interface for the resource store holding secrets.
//!
//! The service only needs "get by namespace/name" and "create". The store reports
//! failures as raw `kube::Error` values; classification happens in the service, so
//! implementations (the real API client, fakes in tests) never translate errors themselves.

use std::sync::Arc;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::api::PostParams;
use kube::{Api, Client};

/// Store trait for Kubernetes secrets
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch the secret `name` in `namespace`
    async fn get(&self, namespace: &str, name: &str) -> Result<Secret, kube::Error>;

    /// Create `secret` in `namespace`, returning the object the store accepted
    async fn create(
        &self,
        namespace: &str,
        secret: &Secret,
        params: &PostParams,
    ) -> Result<Secret, kube::Error>;
}

/// The Kubernetes API server, reached through a namespaced `Api<Secret>` per call
#[async_trait]
impl SecretStore for Client {
    async fn get(&self, namespace: &str, name: &str) -> Result<Secret, kube::Error> {
        let secrets: Api<Secret> = Api::namespaced(self.clone(), namespace);
        secrets.get(name).await
    }

    async fn create(
        &self,
        namespace: &str,
        secret: &Secret,
        params: &PostParams,
    ) -> Result<Secret, kube::Error> {
        let secrets: Api<Secret> = Api::namespaced(self.clone(), namespace);
        secrets.create(params, secret).await
    }
}

#[async_trait]
impl<S: SecretStore + ?Sized> SecretStore for Arc<S> {
    async fn get(&self, namespace: &str, name: &str) -> Result<Secret, kube::Error> {
        (**self).get(namespace, name).await
    }

    async fn create(
        &self,
        namespace: &str,
        secret: &Secret,
        params: &PostParams,
    ) -> Result<Secret, kube::Error> {
        (**self).create(namespace, secret, params).await
    }
}
