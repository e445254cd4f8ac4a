//! SVG chart endpoint: GET /charts/{dataset}/{chart}.svg

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Router,
};
use uuid::Uuid;

use loanctl_core::{ChartKind, ChartSet};

use super::dashboard::apply_selection;
use crate::http::error::ApiError;
use crate::http::extractors::DashboardQuery;
use crate::state::AppState;

fn parse_chart(file: &str) -> Option<ChartKind> {
    ChartKind::from_slug(file.strip_suffix(".svg").unwrap_or(file))
}

/// GET /charts/{dataset}/{chart}
async fn chart_svg(
    State(state): State<Arc<AppState>>,
    Path((dataset, file)): Path<(String, String)>,
    query: DashboardQuery,
) -> Result<impl IntoResponse, ApiError> {
    let not_found = || ApiError::NotFound {
        resource: "chart",
        id: file.clone(),
    };
    let kind = parse_chart(&file).ok_or_else(not_found)?;

    let id = Uuid::parse_str(&dataset).map_err(|_| ApiError::NotFound {
        resource: "dataset",
        id: dataset.clone(),
    })?;
    let stored = state.datasets.get(&id).await.ok_or(ApiError::NotFound {
        resource: "dataset",
        id: dataset.clone(),
    })?;

    let (_, filtered) = apply_selection(&stored.data, query.credit_filter())?;
    let svg = ChartSet::from_dataset(&filtered)
        .render(kind)
        .ok_or_else(not_found)?;

    Ok((
        [
            (header::CONTENT_TYPE, "image/svg+xml"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        svg,
    ))
}

/// Chart routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/charts/{dataset}/{chart}", get(chart_svg))
}
