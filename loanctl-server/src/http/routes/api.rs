//! JSON API: health, datasets, predictions, status

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use loanctl_core::{credit_history_options, Cell, ChartSet, FeatureVector, LoanDataset};

use super::dashboard::apply_selection;
use crate::db::{StoredPrediction, MAX_RECENT};
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, ApiQuery, DashboardQuery};
use crate::state::AppState;

const DEFAULT_RECENT: u32 = 50;

#[derive(Deserialize)]
pub struct UploadParams {
    pub name: Option<String>,
}

/// Summary returned after an upload
#[derive(Serialize)]
pub struct DatasetSummary {
    pub id: Uuid,
    pub name: String,
    pub rows: usize,
    pub columns: Vec<String>,
    /// `None` when the CSV has no `Credit_History` column
    pub credit_history_options: Option<Vec<Cell>>,
    pub uploaded_at: String,
}

/// Filtered view of an uploaded dataset
#[derive(Serialize)]
pub struct FilteredDatasetResponse {
    pub id: Uuid,
    pub name: String,
    pub selected: Vec<Cell>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    pub charts: ChartSet,
}

#[derive(Deserialize)]
pub struct PredictRequest {
    pub income: f64,
    pub loan_amount: f64,
    pub credit_history: u8,
}

#[derive(Serialize)]
pub struct PredictResponse {
    /// "Approved" or "Rejected"
    pub prediction: &'static str,
    pub label: u8,
    pub headline: &'static str,
    pub reason: String,
    pub saved: bool,
    pub id: Option<i64>,
    pub save_error: Option<String>,
}

#[derive(Deserialize)]
pub struct RecentParams {
    pub limit: Option<u32>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub model: String,
    pub store: String,
    pub datasets: usize,
}

/// GET /api/health - liveness only, never touches the database
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// POST /api/datasets - raw CSV body
async fn upload_dataset(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<UploadParams>,
    body: Bytes,
) -> Result<(StatusCode, Json<DatasetSummary>), ApiError> {
    let data = LoanDataset::from_bytes(&body)?;
    let options = credit_history_options(&data).ok();
    let name = params
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| "upload.csv".to_string());

    let stored = state.datasets.insert(name, data).await;

    Ok((
        StatusCode::CREATED,
        Json(DatasetSummary {
            id: stored.id,
            name: stored.name.clone(),
            rows: stored.data.len(),
            columns: stored.data.headers().to_vec(),
            credit_history_options: options,
            uploaded_at: stored.uploaded_at.to_rfc3339(),
        }),
    ))
}

/// GET /api/datasets/{id}?credit_history=0,1
async fn get_dataset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    query: DashboardQuery,
) -> Result<Json<FilteredDatasetResponse>, ApiError> {
    let not_found = || ApiError::NotFound {
        resource: "dataset",
        id: id.clone(),
    };
    let uuid = Uuid::parse_str(&id).map_err(|_| not_found())?;
    let stored = state.datasets.get(&uuid).await.ok_or_else(not_found)?;

    let (filter, filtered) = apply_selection(&stored.data, query.credit_filter())?;
    let charts = ChartSet::from_dataset(&filtered);

    Ok(Json(FilteredDatasetResponse {
        id: stored.id,
        name: stored.name.clone(),
        selected: filter.selected().to_vec(),
        columns: filtered.headers().to_vec(),
        rows: filtered.rows().to_vec(),
        charts,
    }))
}

/// POST /api/predict
async fn predict(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<PredictRequest>,
) -> Result<Json<PredictResponse>, ApiError> {
    let features = FeatureVector::new(req.income, req.loan_amount, req.credit_history)?;
    let outcome = state.predict_and_record(features).await?;
    let p = &outcome.prediction;

    Ok(Json(PredictResponse {
        prediction: p.verdict.as_str(),
        label: p.label,
        headline: p.headline(),
        reason: p.reason(),
        saved: outcome.saved.is_ok(),
        id: outcome.saved.as_ref().ok().copied(),
        save_error: outcome.saved.as_ref().err().cloned(),
    }))
}

/// GET /api/predictions?limit=N - newest first
async fn recent_predictions(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<RecentParams>,
) -> Result<Json<Vec<StoredPrediction>>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_RECENT).clamp(1, MAX_RECENT);
    let rows = state.store.recent(limit).await?;
    Ok(Json(rows))
}

/// GET /api/status
async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        model: state.model.describe(),
        store: state.store.describe(),
        datasets: state.datasets.len().await,
    })
}

/// API routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/datasets", post(upload_dataset))
        .route("/api/datasets/{id}", get(get_dataset))
        .route("/api/predict", post(predict))
        .route("/api/predictions", get(recent_predictions))
        .route("/api/status", get(status))
}
