//! # Constants
//!
//! Default values shared by the service configuration and `secretctl`.

/// Field manager recorded on objects created through the service
pub const DEFAULT_FIELD_MANAGER: &str = "secret-service";

/// Secrets are created for real unless dry-run is requested
pub const DEFAULT_DRY_RUN: bool = false;

/// Default `EnvFilter` directive when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "secret_service=info,secretctl=info";

/// Kubernetes secret type used when none is given on create
pub const DEFAULT_SECRET_TYPE: &str = "Opaque";

/// Namespace used by `secretctl` when `--namespace` is omitted
pub const DEFAULT_NAMESPACE: &str = "default";

/// Environment variable overriding [`DEFAULT_FIELD_MANAGER`]
pub const ENV_FIELD_MANAGER: &str = "SECRET_SERVICE_FIELD_MANAGER";

/// Environment variable overriding [`DEFAULT_DRY_RUN`]
pub const ENV_DRY_RUN: &str = "SECRET_SERVICE_DRY_RUN";
