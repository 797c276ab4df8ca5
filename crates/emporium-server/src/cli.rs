//! Operator command line.

use crate::app::AppContext;
use crate::startup::StartupSummary;
use clap::{Parser, Subcommand};
use emporium_core::{EmporiumError, ErrorResponse};
use emporium_service::CacheAdminService;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Parser)]
#[command(name = "emporium")]
#[command(author, version, about = "Emporium operator tools")]
pub struct Cli {
    /// Directory holding `default.toml` and per-environment overrides
    #[arg(long, env = "EMPORIUM_CONFIG_DIR", default_value = "./config")]
    pub config_dir: String,

    /// Environment name (development, staging, production)
    #[arg(long, env = "EMPORIUM_ENVIRONMENT")]
    pub environment: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Inspect and manage the cache
    Cache {
        #[command(subcommand)]
        action: CacheCommand,
    },
    /// Show which store and cache the configuration resolves to
    Status,
}

#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Hit, miss and invalidation counters plus backend status
    Stats,
    /// Probe the backend
    Health,
    /// Drop every key
    Flush,
    /// Delete one key
    Delete {
        key: String,
    },
    /// Delete every key matching a glob
    DeletePattern {
        pattern: String,
    },
    /// List keys matching a glob (all keys by default)
    Keys {
        pattern: Option<String>,
    },
    /// Stats plus key counts per prefix
    Info,
}

/// Runs a parsed command and returns its JSON answer.
pub async fn execute(app: &AppContext, command: &Commands) -> anyhow::Result<Value> {
    match command {
        Commands::Status => to_json(&StartupSummary::collect(app).await),
        Commands::Cache { action } => run_cache_command(app.cache_admin.as_ref(), action).await,
    }
}

async fn run_cache_command(
    admin: &dyn CacheAdminService,
    action: &CacheCommand,
) -> anyhow::Result<Value> {
    let answer = match action {
        CacheCommand::Stats => to_json(&admin.stats().await)?,
        CacheCommand::Health => to_json(&admin.health().await)?,
        CacheCommand::Flush => json!({ "flushed": admin.flush_all().await }),
        CacheCommand::Delete { key } => json!({
            "key": key,
            "deleted": admin.delete_key(key).await,
        }),
        CacheCommand::DeletePattern { pattern } => json!({
            "pattern": pattern,
            "deleted": admin.delete_pattern(pattern).await,
        }),
        CacheCommand::Keys { pattern } => {
            let keys = admin.keys(pattern.as_deref()).await;
            json!({ "count": keys.len(), "keys": keys })
        }
        CacheCommand::Info => to_json(&admin.info().await)?,
    };
    Ok(answer)
}

fn to_json<T: Serialize>(value: &T) -> anyhow::Result<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Exit code and printable report for a failed run.
///
/// Client errors (bad input, missing or conflicting records) exit with 2,
/// everything else with 1.
#[must_use]
pub fn failure_report(err: &anyhow::Error) -> (i32, ErrorResponse) {
    let message = format!("{err:#}");
    match err
        .chain()
        .find_map(|cause| cause.downcast_ref::<EmporiumError>())
    {
        Some(cause) => {
            let code = if cause.is_client_error() { 2 } else { 1 };
            (code, ErrorResponse::from_error(cause).with_message(message))
        }
        None => (
            1,
            ErrorResponse::from_error(&EmporiumError::internal("unexpected failure"))
                .with_message(message),
        ),
    }
}
