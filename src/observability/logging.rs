//! # Logging
//!
//! Tracing subscriber setup for binaries embedding the service.
//!
//! The service itself never installs a subscriber: it logs into whatever
//! `tracing::Dispatch` it was constructed with.

use anyhow::Result;

use crate::constants::DEFAULT_LOG_FILTER;

/// Install a global fmt subscriber filtered by `RUST_LOG`
///
/// Falls back to `default_filter` (or [`DEFAULT_LOG_FILTER`]) when `RUST_LOG` is unset or invalid.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(default_filter: Option<&str>) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.unwrap_or(DEFAULT_LOG_FILTER).into()),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {e}"))
}
