//! HTTP server command for the loan dashboard

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use loanctl_core::load_model;
use loanctl_server::db::{create_pool_with_options, migrations, MemoryStore, MySqlStore, PredictionStore};
use loanctl_server::{run_server, AppState, ServerConfig};

use super::load_config;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default from config: 127.0.0.1:8501)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Model artifact (JSON)
    #[arg(long, short = 'm')]
    pub model: Option<PathBuf>,

    /// Keep predictions in memory instead of MySQL
    #[arg(long)]
    pub ephemeral: bool,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, config_path: Option<&Path>) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if args.cors_permissive {
        config.server.cors_permissive = true;
    }
    if let Some(url) = args.database_url {
        config.database.url = url;
    }
    if let Some(model) = args.model {
        config.model.path = model;
    }

    let model = load_model(&config.model.path)
        .with_context(|| format!("Failed to load model from {}", config.model.path.display()))?;

    let store: Arc<dyn PredictionStore> = if args.ephemeral {
        tracing::warn!("Ephemeral mode: predictions are kept in memory only");
        Arc::new(MemoryStore::new())
    } else {
        let pool = create_pool_with_options(&config.database.url, config.database.max_connections)
            .context("Invalid database URL")?;

        // Non-fatal: each write reports its own failure.
        if let Err(e) = migrations::run(&pool).await {
            tracing::warn!(
                database = %config.redacted_database_url(),
                error = %e,
                "Could not prepare loan_predictions table; predictions will not be saved until the database is reachable"
            );
        }
        Arc::new(MySqlStore::new(pool))
    };

    tracing::info!(
        model = %config.model.path.display(),
        store = %store.describe(),
        "Starting loanctl dashboard on {}",
        config.server.bind
    );

    let state = Arc::new(AppState::new(
        Arc::new(model),
        store,
        config.server.max_datasets,
    ));

    run_server(state, ServerConfig::from(&config))
        .await
        .context("Server error")?;

    Ok(())
}
