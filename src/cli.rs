//! # secretctl
//!
//! Command-line interface over the secret service.
//!
//! Reads and creates Kubernetes secrets through the same access layer controllers use,
//! so NotFound/Conflict handling behaves exactly as it does in-process.
//!
//! ## Usage
//!
//! ```bash
//! # Show a secret (keys and sizes only)
//! secretctl get redis-auth --namespace redis
//!
//! # Dump a secret as YAML with decoded values
//! secretctl get redis-auth -n redis -o yaml --decode
//!
//! # Create a secret from literals and a .env file
//! secretctl create redis-auth -n redis --from-literal password=s3cr3t --from-env-file ./redis.env
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use base64::Engine;
use clap::{Parser, Subcommand, ValueEnum};
use kube::Client;
use secret_service::constants::{DEFAULT_NAMESPACE, DEFAULT_SECRET_TYPE};
use secret_service::observability::{init_tracing, metrics::NoopMetrics};
use secret_service::{SecretRecord, SecretService, ServiceConfig};
use serde::Serialize;
use tracing::{debug, Dispatch};

/// Kubernetes secret access CLI
#[derive(Parser)]
#[command(name = "secretctl")]
#[command(about = "Read and create Kubernetes secrets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Kubernetes namespace (defaults to "default")
    #[arg(short, long, global = true)]
    namespace: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a secret
    Get {
        /// Name of the secret
        name: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,

        /// Print decoded values instead of sizes (text) or base64 (json/yaml)
        #[arg(long)]
        decode: bool,
    },
    /// Create a secret; fails if it already exists
    Create {
        /// Name of the secret
        name: String,

        /// Key and literal value to insert (key=value), repeatable
        #[arg(long = "from-literal", value_parser = parse_literal)]
        from_literal: Vec<(String, String)>,

        /// Read key=value pairs from a .env file
        #[arg(long)]
        from_env_file: Option<PathBuf>,

        /// Secret type
        #[arg(long = "type", default_value = DEFAULT_SECRET_TYPE)]
        secret_type: String,

        /// Validate the request server-side without persisting it
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Yaml,
}

/// Install ring as the process-wide rustls provider
///
/// Must run before the Kubernetes client is built. Returns false if a provider was already set.
fn install_crypto_provider() -> bool {
    let installed = rustls::crypto::ring::default_provider()
        .install_default()
        .is_ok();
    if !installed {
        debug!("rustls crypto provider already installed");
    }
    installed
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(None)?;
    install_crypto_provider();

    let cli = Cli::parse();
    let namespace = cli
        .namespace
        .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client. Ensure kubeconfig is configured.")?;

    let logger = tracing::dispatcher::get_default(Dispatch::clone);
    let service = SecretService::new(client, logger, Arc::new(NoopMetrics))
        .with_config(ServiceConfig::from_env());

    match cli.command {
        Commands::Get {
            name,
            output,
            decode,
        } => get_command(&service, &namespace, &name, output, decode).await,
        Commands::Create {
            name,
            from_literal,
            from_env_file,
            secret_type,
            dry_run,
        } => {
            let data = build_data(&from_literal, from_env_file.as_deref())?;
            let record = SecretRecord::new(namespace, name, data).with_type(secret_type);
            let mut config = service.config().clone();
            config.dry_run |= dry_run;
            create_command(&service.with_config(config), &record).await
        }
    }
}

async fn get_command(
    service: &SecretService,
    namespace: &str,
    name: &str,
    output: OutputFormat,
    decode: bool,
) -> Result<()> {
    let record = match service.get_secret(namespace, name).await {
        Ok(record) => record,
        Err(e) if e.is_not_found() => {
            anyhow::bail!("Secret '{namespace}/{name}' not found");
        }
        Err(e) => {
            return Err(anyhow::Error::new(e))
                .with_context(|| format!("Failed to get secret '{namespace}/{name}'"));
        }
    };

    match output {
        OutputFormat::Text => print!("{}", render_text(&record, decode)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&SecretView::new(&record, decode))?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&SecretView::new(&record, decode))?),
    }
    Ok(())
}

async fn create_command(service: &SecretService, record: &SecretRecord) -> Result<()> {
    let secret = record.secret_ref();
    let created = match service.create_secret(record).await {
        Ok(created) => created,
        Err(e) if e.is_conflict() => {
            anyhow::bail!("Secret '{secret}' already exists");
        }
        Err(e) => {
            return Err(anyhow::Error::new(e))
                .with_context(|| format!("Failed to create secret '{secret}'"));
        }
    };

    let suffix = if service.config().dry_run {
        " (dry run)"
    } else {
        ""
    };
    println!(
        "✅ Secret '{}' created with {} keys{}",
        created.secret_ref(),
        created.data().len(),
        suffix
    );
    Ok(())
}

/// Parse a `key=value` literal; the value may itself contain `=`
fn parse_literal(literal: &str) -> Result<(String, String), String> {
    match literal.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("invalid literal '{literal}', expected key=value")),
    }
}

/// Merge env-file entries and literals into secret data, rejecting duplicate keys
fn build_data(
    literals: &[(String, String)],
    env_file: Option<&Path>,
) -> Result<BTreeMap<String, Vec<u8>>> {
    let mut data = BTreeMap::new();

    if let Some(path) = env_file {
        let entries = dotenvy::from_path_iter(path)
            .with_context(|| format!("Failed to read env file {}", path.display()))?;
        for entry in entries {
            let (key, value) =
                entry.with_context(|| format!("Failed to parse env file {}", path.display()))?;
            insert_unique(&mut data, key, value)?;
        }
    }

    for (key, value) in literals {
        insert_unique(&mut data, key.clone(), value.clone())?;
    }

    if data.is_empty() {
        anyhow::bail!("No data given: use --from-literal or --from-env-file");
    }
    Ok(data)
}

fn insert_unique(data: &mut BTreeMap<String, Vec<u8>>, key: String, value: String) -> Result<()> {
    if data.contains_key(&key) {
        anyhow::bail!("Duplicate key '{key}'");
    }
    data.insert(key, value.into_bytes());
    Ok(())
}

fn render_text(record: &SecretRecord, decode: bool) -> String {
    let mut out = format!("Secret '{}':\n", record.secret_ref());
    out.push_str(&format!(
        "  Type: {}\n",
        record.secret_type().unwrap_or("<none>")
    ));
    if let Some(version) = record.resource_version() {
        out.push_str(&format!("  Resource Version: {version}\n"));
    }
    out.push_str("\nData:\n");
    if record.data().is_empty() {
        out.push_str("  <empty>\n");
    }
    for (key, value) in record.data() {
        if decode {
            out.push_str(&format!("  {key}: {}\n", String::from_utf8_lossy(value)));
        } else {
            out.push_str(&format!("  {key}: {} bytes\n", value.len()));
        }
    }
    out
}

/// Serializable view of a record for json/yaml output
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SecretView {
    namespace: String,
    name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    secret_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resource_version: Option<String>,
    data: BTreeMap<String, String>,
}

impl SecretView {
    fn new(record: &SecretRecord, decode: bool) -> Self {
        let data = record
            .data()
            .iter()
            .map(|(key, value)| {
                let rendered = if decode {
                    String::from_utf8_lossy(value).into_owned()
                } else {
                    base64::engine::general_purpose::STANDARD.encode(value)
                };
                (key.clone(), rendered)
            })
            .collect();
        Self {
            namespace: record.namespace().to_string(),
            name: record.name().to_string(),
            secret_type: record.secret_type().map(str::to_string),
            resource_version: record.resource_version().map(str::to_string),
            data,
        }
    }
}
