//! # Secret Error Types
//!
//! Defines the error returned by every service operation, with classification of
//! store failures into NotFound, Conflict and Other.
//!
//! The Kubernetes API reports failures as `kube::Error` values (an API `Status` with an
//! HTTP code and a reason, or a transport error). Callers must never match on those:
//! [`classify`] is the single place where they are translated, and the result is checked
//! with [`SecretError::is_not_found`] / [`SecretError::is_conflict`] or [`SecretError::kind`].

use std::error::Error as StdError;

use thiserror::Error;

use crate::record::SecretRef;

/// Reason the API server puts in a `Status` for missing objects
const REASON_NOT_FOUND: &str = "NotFound";
/// Reason the API server puts in a `Status` when create collides with an existing object
const REASON_ALREADY_EXISTS: &str = "AlreadyExists";
/// Reason for optimistic-concurrency and other 409 conflicts
const REASON_CONFLICT: &str = "Conflict";

/// Error returned by [`crate::SecretService`] operations
#[derive(Debug, Error)]
pub enum SecretError {
    /// The requested secret does not exist in the store
    #[error("secret {secret} not found")]
    NotFound {
        secret: SecretRef,
        #[source]
        source: kube::Error,
    },

    /// A create collided with an existing secret of the same identity
    #[error("secret {secret} already exists")]
    Conflict {
        secret: SecretRef,
        #[source]
        source: kube::Error,
    },

    /// Any other store failure (permissions, transport, server errors)
    #[error("store request for secret {secret} failed")]
    Store {
        secret: SecretRef,
        #[source]
        source: kube::Error,
    },

    /// The store answered with an object that is not the one requested
    #[error("store returned {returned} when {requested} was requested")]
    IdentityMismatch {
        requested: SecretRef,
        returned: String,
    },
}

impl SecretError {
    /// Classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            SecretError::NotFound { .. } => ErrorKind::NotFound,
            SecretError::Conflict { .. } => ErrorKind::Conflict,
            SecretError::Store { .. } | SecretError::IdentityMismatch { .. } => ErrorKind::Other,
        }
    }

    /// True when the requested secret does not exist
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// True when a create collided with an existing secret
    pub fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }

    /// Identity of the secret the failed operation targeted
    pub fn secret(&self) -> &SecretRef {
        match self {
            SecretError::NotFound { secret, .. }
            | SecretError::Conflict { secret, .. }
            | SecretError::Store { secret, .. } => secret,
            SecretError::IdentityMismatch { requested, .. } => requested,
        }
    }
}

/// Classification of secret store failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Object absent
    NotFound,
    /// Object already exists (or a concurrent write won)
    Conflict,
    /// Everything else; treat as unexpected
    Other,
}

impl ErrorKind {
    /// Get stable reason string for metrics and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Other => "other",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a store error for the given secret
///
/// Only API responses are inspected. HTTP code and `Status.reason` are both checked so
/// stores that fill in just one of them (older API servers, fakes) still classify.
/// Transport and client-side errors are always [`ErrorKind::Other`].
pub fn classify(secret: SecretRef, source: kube::Error) -> SecretError {
    match store_error_kind(&source) {
        ErrorKind::NotFound => SecretError::NotFound { secret, source },
        ErrorKind::Conflict => SecretError::Conflict { secret, source },
        ErrorKind::Other => SecretError::Store { secret, source },
    }
}

/// Classify a store error returned by a create request
///
/// A create never reports NotFound: a 404 there names some other missing object
/// (usually the namespace), so it is reported as [`ErrorKind::Other`].
pub fn classify_create(secret: SecretRef, source: kube::Error) -> SecretError {
    match store_error_kind(&source) {
        ErrorKind::Conflict => SecretError::Conflict { secret, source },
        ErrorKind::NotFound | ErrorKind::Other => SecretError::Store { secret, source },
    }
}

fn store_error_kind(error: &kube::Error) -> ErrorKind {
    match error {
        kube::Error::Api(response) => {
            if response.code == 404 || response.reason == REASON_NOT_FOUND {
                ErrorKind::NotFound
            } else if response.code == 409
                || response.reason == REASON_ALREADY_EXISTS
                || response.reason == REASON_CONFLICT
            {
                ErrorKind::Conflict
            } else {
                ErrorKind::Other
            }
        }
        _ => ErrorKind::Other,
    }
}

/// Check whether any error in the chain is a [`SecretError`] of kind NotFound
///
/// Works on errors that wrap a `SecretError`, e.g. `anyhow::Error` built with `.context()`:
/// `is_not_found(&*err)`.
pub fn is_not_found(error: &(dyn StdError + 'static)) -> bool {
    find_kind(error) == Some(ErrorKind::NotFound)
}

/// Check whether any error in the chain is a [`SecretError`] of kind Conflict
pub fn is_conflict(error: &(dyn StdError + 'static)) -> bool {
    find_kind(error) == Some(ErrorKind::Conflict)
}

fn find_kind(error: &(dyn StdError + 'static)) -> Option<ErrorKind> {
    let mut current = Some(error);
    while let Some(err) = current {
        if let Some(secret_error) = err.downcast_ref::<SecretError>() {
            return Some(secret_error.kind());
        }
        current = err.source();
    }
    None
}
