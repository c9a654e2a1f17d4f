//! Quota Manager CLI
//!
//! Command-line front end over the Quota Manager backend: settings, login,
//! strategy management and quota transfers

use anyhow::{Context, Result};
use clap::Parser;
use quota_manager::config::AppEnv;
use quota_manager::services::TracingNotifier;
use quota_manager::utils::logging::{init_logging, LogFormat};
use quota_manager::{ApiClient, AppError, ConfigResolver, Environment, FileStorage, Notifier};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, warn};

mod cli;

use cli::{Cli, StderrNotifier};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Request failures were already shown by the notifier
            let notified = e
                .downcast_ref::<AppError>()
                .is_some_and(|err| err.is_application() || err.is_transport());
            if !notified {
                eprintln!("Error: {:#}", e);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let env = Environment::from_env();

    let filter = log_filter(cli.verbose, env.feature_flags().debug_mode);
    let format = LogFormat::from_env_value(std::env::var("LOG_FORMAT").ok().as_deref());
    init_logging(&filter, format)?;

    let storage = match &cli.storage {
        Some(path) => FileStorage::open(path),
        None => FileStorage::open_default(),
    }
    .context("Failed to open settings store")?;
    debug!("Using store {:?}", storage.path());

    let resolver = ConfigResolver::new(Arc::new(storage), env);

    if resolver.environment().app_env() == AppEnv::Development {
        if let Err(e) = resolver.validate() {
            warn!("Configuration validation failed: {}", e);
        }
    }

    // With JSON logs, notifications join the log stream
    let notifier: Arc<dyn Notifier> = match format {
        LogFormat::Json => Arc::new(TracingNotifier),
        LogFormat::Text => Arc::new(StderrNotifier),
    };
    let client = ApiClient::new(resolver, notifier.clone())
        .context("Failed to create API client")?;
    let client = Arc::new(client);

    cli::run(cli.command, client, notifier).await
}

/// Log filter from `RUST_LOG`, else from verbosity and debug mode
fn log_filter(verbose: u8, debug_mode: bool) -> String {
    if let Ok(filter) = std::env::var("RUST_LOG") {
        if !filter.is_empty() {
            return filter;
        }
    }

    match (verbose, debug_mode) {
        (0, false) => "warn".to_string(),
        (1, false) => "info".to_string(),
        _ => "debug".to_string(),
    }
}
