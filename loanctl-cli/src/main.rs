//! loanctl CLI - loan approval dashboard and tooling
//!
//! - `serve`: run the web dashboard (upload, filter, charts, predict)
//! - `predict`: score one applicant from the command line
//! - `inspect`: summarise a loan CSV the way the dashboard would
//! - `config`: show or initialise `~/.loanctl/config.toml`

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "loanctl",
    author,
    version,
    about = "Loan approval dashboard: upload, filter, chart and predict",
    long_about = "Serve a dashboard for exploring loan application CSVs and scoring applicants \
                  with a pre-trained model. Every prediction is logged to MySQL."
)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    /// Config file (default: ~/.loanctl/config.toml)
    #[arg(long, global = true, env = "LOANCTL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the dashboard HTTP server
    Serve(commands::serve::ServeArgs),
    /// Predict approval for a single applicant
    Predict(commands::predict::PredictArgs),
    /// Preview a loan CSV, its credit-history options and chart data
    Inspect(commands::inspect::InspectArgs),
    /// Manage loanctl configuration (path, show, init)
    Config(commands::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug }).ok();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Serve(args) => commands::run_serve(args, config_path).await?,
        Commands::Predict(args) => commands::run_predict(args, config_path).await?,
        Commands::Inspect(args) => commands::run_inspect(args)?,
        Commands::Config(args) => commands::run_config(args, config_path)?,
    }
    Ok(())
}
