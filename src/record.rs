//! # Secret Records
//!
//! Caller-facing snapshot of a Kubernetes `Secret` and the reference used to address it.
//!
//! Records are built fresh from whatever the store returns and are owned by the caller
//! afterwards. Value bytes are zeroized on drop and never appear in `Debug` output.

use std::collections::BTreeMap;
use std::fmt;

use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use zeroize::Zeroize;

use crate::error::SecretError;

/// Identity of a secret in the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SecretRef {
    pub namespace: String,
    pub name: String,
}

impl SecretRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for SecretRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Snapshot of a secret's identity and data
#[derive(Clone, PartialEq, Eq)]
pub struct SecretRecord {
    secret: SecretRef,
    data: BTreeMap<String, Vec<u8>>,
    secret_type: Option<String>,
    resource_version: Option<String>,
}

impl SecretRecord {
    /// Build a record to hand to [`crate::SecretService::create_secret`]
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        data: BTreeMap<String, Vec<u8>>,
    ) -> Self {
        Self {
            secret: SecretRef::new(namespace, name),
            data,
            secret_type: None,
            resource_version: None,
        }
    }

    /// Set the Kubernetes secret type (`Opaque`, `kubernetes.io/tls`, ...)
    #[must_use]
    pub fn with_type(mut self, secret_type: impl Into<String>) -> Self {
        self.secret_type = Some(secret_type.into());
        self
    }

    pub fn namespace(&self) -> &str {
        &self.secret.namespace
    }

    pub fn name(&self) -> &str {
        &self.secret.name
    }

    pub fn secret_ref(&self) -> &SecretRef {
        &self.secret
    }

    pub fn data(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.data
    }

    /// Value stored under `key`
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.data.get(key).map(Vec::as_slice)
    }

    pub fn secret_type(&self) -> Option<&str> {
        self.secret_type.as_deref()
    }

    /// Resource version reported by the store, absent on records built locally
    pub fn resource_version(&self) -> Option<&str> {
        self.resource_version.as_deref()
    }

    /// Convert a store object into a record, enforcing that it is the requested secret
    ///
    /// The object's namespace and name must both be present and equal to `requested`.
    /// `stringData` entries are folded over `data` the way the API server merges them.
    pub fn from_store(requested: &SecretRef, secret: Secret) -> Result<Self, SecretError> {
        let returned_namespace = secret.metadata.namespace.as_deref();
        let returned_name = secret.metadata.name.as_deref();
        if returned_namespace != Some(requested.namespace.as_str())
            || returned_name != Some(requested.name.as_str())
        {
            return Err(SecretError::IdentityMismatch {
                requested: requested.clone(),
                returned: format!(
                    "{}/{}",
                    returned_namespace.unwrap_or("<none>"),
                    returned_name.unwrap_or("<none>")
                ),
            });
        }

        Ok(Self::accepted(requested, secret))
    }

    /// Convert the object a store returned for an accepted write
    ///
    /// The write already happened under `requested`, so the record keeps that identity
    /// whatever metadata the store echoes back.
    pub fn accepted(requested: &SecretRef, secret: Secret) -> Self {
        let Secret {
            metadata,
            data,
            string_data,
            type_,
            ..
        } = secret;

        let mut values: BTreeMap<String, Vec<u8>> = data
            .unwrap_or_default()
            .into_iter()
            .map(|(key, ByteString(bytes))| (key, bytes))
            .collect();
        for (key, value) in string_data.unwrap_or_default() {
            values.insert(key, value.into_bytes());
        }

        Self {
            secret: requested.clone(),
            data: values,
            secret_type: type_,
            resource_version: metadata.resource_version,
        }
    }

    /// Kubernetes object for a create request
    pub fn to_secret(&self) -> Secret {
        Secret {
            metadata: ObjectMeta {
                name: Some(self.secret.name.clone()),
                namespace: Some(self.secret.namespace.clone()),
                ..ObjectMeta::default()
            },
            data: Some(
                self.data
                    .iter()
                    .map(|(key, value)| (key.clone(), ByteString(value.clone())))
                    .collect(),
            ),
            type_: self.secret_type.clone(),
            ..Secret::default()
        }
    }
}

impl fmt::Debug for SecretRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretRecord")
            .field("secret", &self.secret)
            .field("keys", &self.data.keys().collect::<Vec<_>>())
            .field("secret_type", &self.secret_type)
            .field("resource_version", &self.resource_version)
            .finish()
    }
}

impl Drop for SecretRecord {
    fn drop(&mut self) {
        for value in self.data.values_mut() {
            value.zeroize();
        }
    }
}
