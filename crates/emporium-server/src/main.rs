//! # Emporium
//!
//! Operator entry point. Loads configuration, initialises logging, wires the
//! application and runs one command, printing its answer as JSON.
//!
//! ```bash
//! emporium status
//! emporium cache stats
//! emporium cache delete-pattern 'search:*'
//! ```

use anyhow::Context;
use clap::Parser;
use emporium_config::{ConfigLoader, ObservabilityConfig};
use emporium_server::app::AppContext;
use emporium_server::cli::{execute, failure_report, Cli};
use emporium_server::startup::{print_startup_info, StartupSummary};
use tracing::{debug, error};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("Command failed: {:#}", e);
        let (code, report) = failure_report(&e);
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(_) => eprintln!("error: {e:#}"),
        }
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let loader = match &cli.environment {
        Some(environment) => ConfigLoader::for_environment(&cli.config_dir, environment),
        None => ConfigLoader::new(&cli.config_dir),
    }
    .with_context(|| format!("loading configuration from {}", cli.config_dir))?;
    let config = loader.get().await;

    init_logging(&config.observability);
    debug!("Loaded configuration for environment: {}", config.app.environment);

    let app = AppContext::build(config)
        .await
        .context("building application")?;
    print_startup_info(&StartupSummary::collect(&app).await);

    let outcome = execute(&app, &cli.command).await;
    app.shutdown().await;

    println!("{}", serde_json::to_string_pretty(&outcome?)?);
    Ok(())
}

fn init_logging(config: &ObservabilityConfig) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let directive = if config.log_level.contains('=') {
        config.log_level.clone()
    } else {
        format!("warn,emporium={}", config.log_level)
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    let registry = tracing_subscriber::registry().with(filter);
    if config.is_json() {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
