//! One-off prediction from the command line

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use loanctl_core::{load_model, predict, FeatureVector, Prediction};
use loanctl_server::db::{create_pool, migrations, MySqlStore, PredictionRecord, PredictionStore};

use super::load_config;

#[derive(Parser, Debug)]
pub struct PredictArgs {
    /// Applicant income
    #[arg(long)]
    pub income: f64,

    /// Requested loan amount
    #[arg(long)]
    pub loan_amount: f64,

    /// Credit history (0 or 1)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=1))]
    pub credit_history: u8,

    /// Model artifact (JSON); defaults to the configured path
    #[arg(long, short = 'm')]
    pub model: Option<PathBuf>,

    /// Write the result to the loan_predictions table
    #[arg(long)]
    pub save: bool,

    /// Database URL used with --save
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct PredictOutput<'a> {
    prediction: &'static str,
    label: u8,
    headline: &'static str,
    reason: String,
    features: &'a FeatureVector,
    #[serde(skip_serializing_if = "Option::is_none")]
    saved_id: Option<i64>,
}

pub async fn run_predict(args: PredictArgs, config_path: Option<&Path>) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(model) = args.model {
        config.model.path = model;
    }
    if let Some(url) = args.database_url {
        config.database.url = url;
    }

    let model = load_model(&config.model.path)
        .with_context(|| format!("Failed to load model from {}", config.model.path.display()))?;
    let features = FeatureVector::new(args.income, args.loan_amount, args.credit_history)?;
    let prediction = predict(&model, features)?;

    let saved_id = if args.save {
        Some(save(&prediction, &config.database.url).await?)
    } else {
        None
    };

    if args.json {
        let output = PredictOutput {
            prediction: prediction.verdict.as_str(),
            label: prediction.label,
            headline: prediction.headline(),
            reason: prediction.reason(),
            features: &prediction.features,
            saved_id,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", prediction.headline());
        println!("{}", prediction.reason());
        if let Some(id) = saved_id {
            println!("Data saved successfully to the database! (id {})", id);
        }
    }
    Ok(())
}

async fn save(prediction: &Prediction, database_url: &str) -> Result<i64> {
    let pool = create_pool(database_url).context("Invalid database URL")?;
    migrations::run(&pool).await.context("Database Error")?;
    let id = MySqlStore::new(pool)
        .insert(&PredictionRecord::from(prediction))
        .await
        .context("Database Error")?;
    tracing::info!(id, "prediction saved");
    Ok(id)
}
