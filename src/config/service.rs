//! # Secret Service Configuration
//!
//! Write-path settings applied to every `create` request.

use kube::api::PostParams;

use super::env_var_or_default;
use crate::constants::{DEFAULT_DRY_RUN, DEFAULT_FIELD_MANAGER, ENV_DRY_RUN, ENV_FIELD_MANAGER};

/// Secret service configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Field manager sent with create requests (shows up in `managedFields`)
    pub field_manager: String,
    /// Ask the API server to validate creates without persisting them
    pub dry_run: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            field_manager: DEFAULT_FIELD_MANAGER.to_string(),
            dry_run: DEFAULT_DRY_RUN,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            field_manager: env_var_or_default(ENV_FIELD_MANAGER, DEFAULT_FIELD_MANAGER.to_string()),
            dry_run: env_var_or_default(ENV_DRY_RUN, DEFAULT_DRY_RUN),
        }
    }

    /// Request parameters for a create call
    pub fn post_params(&self) -> PostParams {
        PostParams {
            dry_run: self.dry_run,
            field_manager: (!self.field_manager.is_empty()).then(|| self.field_manager.clone()),
        }
    }
}
