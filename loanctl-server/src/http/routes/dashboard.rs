//! Dashboard pages: GET /, POST /upload, POST /predict

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use loanctl_core::dataset::PREVIEW_ROWS;
use loanctl_core::{
    credit_history_options, filter_by_credit_history, ChartSet, CreditFilter, FeatureVector,
    LoanDataset,
};

use crate::http::extractors::{split_selection, DashboardQuery};
use crate::http::view::{render_dashboard, DashboardView, DatasetPanel, FilteredPanel, PredictFormValues};
use crate::sessions::StoredDataset;
use crate::state::AppState;

/// Resolve the user's selection (or the default of every option) and filter.
pub fn apply_selection(
    data: &LoanDataset,
    selection: Option<CreditFilter>,
) -> loanctl_core::Result<(CreditFilter, LoanDataset)> {
    let filter = match selection {
        Some(filter) => filter,
        None => CreditFilter::all(data)?,
    };
    let filtered = filter_by_credit_history(data, &filter)?;
    Ok((filter, filtered))
}

fn filtered_panel(
    data: &LoanDataset,
    selection: Option<CreditFilter>,
) -> loanctl_core::Result<FilteredPanel> {
    let options = credit_history_options(data)?;
    let explicit = selection.is_some();
    let (filter, filtered) = apply_selection(data, selection)?;
    Ok(FilteredPanel {
        options,
        filter,
        explicit,
        charts: ChartSet::from_dataset(&filtered),
        data: filtered,
    })
}

/// Build the dataset section of the page.
///
/// A missing `Credit_History` column still shows the preview, with the
/// reason in place of the filtered table.
pub fn build_panel(stored: &StoredDataset, selection: Option<CreditFilter>) -> DatasetPanel {
    DatasetPanel {
        id: stored.id,
        name: stored.name.clone(),
        preview: stored.data.head(PREVIEW_ROWS),
        filtered: filtered_panel(&stored.data, selection).map_err(|e| e.to_string()),
    }
}

async fn load_panel(
    state: &AppState,
    id: Option<Uuid>,
    selection: Option<CreditFilter>,
) -> (Option<DatasetPanel>, Option<String>) {
    let Some(id) = id else {
        return (None, None);
    };
    match state.datasets.get(&id).await {
        Some(stored) => (Some(build_panel(&stored, selection)), None),
        None => (
            None,
            Some("That upload is no longer available. Please upload the CSV again.".to_string()),
        ),
    }
}

fn page(status: StatusCode, view: &DashboardView) -> Response {
    (status, Html(render_dashboard(view))).into_response()
}

/// GET /
async fn index(State(state): State<Arc<AppState>>, query: DashboardQuery) -> Response {
    let (dataset, error) = load_panel(&state, query.dataset, query.credit_filter()).await;
    let status = if error.is_some() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    };
    page(
        status,
        &DashboardView {
            dataset,
            error,
            ..Default::default()
        },
    )
}

/// POST /upload - multipart field `file`
async fn upload(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Response {
    let mut upload: Option<(String, Vec<u8>)> = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return upload_error(format!("Upload failed: {}", e)),
        };
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or("upload.csv").to_string();
        match field.bytes().await {
            Ok(bytes) => upload = Some((name, bytes.to_vec())),
            Err(e) => return upload_error(format!("Upload failed: {}", e)),
        }
    }

    let Some((name, bytes)) = upload else {
        return upload_error("Choose a CSV file to upload.".to_string());
    };

    match LoanDataset::from_bytes(&bytes) {
        Ok(data) => {
            let stored = state.datasets.insert(name, data).await;
            Redirect::to(&format!("/?dataset={}", stored.id)).into_response()
        }
        Err(e) => {
            tracing::warn!(file = %name, error = %e, "rejected upload");
            upload_error(format!("Could not read {}: {}", name, e))
        }
    }
}

fn upload_error(message: String) -> Response {
    page(
        StatusCode::BAD_REQUEST,
        &DashboardView {
            error: Some(message),
            ..Default::default()
        },
    )
}

/// Prediction form fields. Numbers arrive as text so bad input can be
/// reported on the page instead of as a bare rejection.
#[derive(Debug, Deserialize)]
pub struct PredictForm {
    pub income: String,
    pub loan_amount: String,
    pub credit_history: String,
    #[serde(default)]
    pub dataset: Option<String>,
    /// Credit-history selection carried over from the filter: each value
    /// percent-encoded, joined with commas
    #[serde(default)]
    pub selection: Option<String>,
}

impl PredictForm {
    fn parse_features(&self) -> Result<FeatureVector, String> {
        let income: f64 = self
            .income
            .trim()
            .parse()
            .map_err(|_| "Applicant Income must be a number".to_string())?;
        let loan_amount: f64 = self
            .loan_amount
            .trim()
            .parse()
            .map_err(|_| "Loan Amount must be a number".to_string())?;
        let credit_history: u8 = self
            .credit_history
            .trim()
            .parse()
            .map_err(|_| "Credit History must be 0 or 1".to_string())?;
        FeatureVector::new(income, loan_amount, credit_history).map_err(|e| e.to_string())
    }

    fn values(&self) -> PredictFormValues {
        PredictFormValues {
            income: self.income.clone(),
            loan_amount: self.loan_amount.clone(),
            credit_history: u8::from(self.credit_history.trim() == "1"),
        }
    }

    fn context(&self) -> (Option<Uuid>, Option<CreditFilter>) {
        let dataset = self
            .dataset
            .as_deref()
            .and_then(|id| Uuid::parse_str(id.trim()).ok());
        let selection = self
            .selection
            .as_deref()
            .map(|s| CreditFilter::from_raw(split_selection(s)));
        (dataset, selection)
    }
}

/// POST /predict
async fn predict(State(state): State<Arc<AppState>>, Form(form): Form<PredictForm>) -> Response {
    let (dataset_id, selection) = form.context();
    let (dataset, _) = load_panel(&state, dataset_id, selection).await;

    let mut view = DashboardView {
        dataset,
        form: form.values(),
        ..Default::default()
    };

    let features = match form.parse_features() {
        Ok(features) => features,
        Err(message) => {
            view.error = Some(message);
            return page(StatusCode::BAD_REQUEST, &view);
        }
    };

    match state.predict_and_record(features).await {
        Ok(outcome) => {
            view.outcome = Some(outcome);
            page(StatusCode::OK, &view)
        }
        Err(e) => {
            tracing::error!(error = %e, "prediction failed");
            let status = if e.is_client_error() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            view.error = Some(e.to_string());
            page(status, &view)
        }
    }
}

/// Dashboard routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/upload", post(upload))
        .route("/predict", post(predict))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(income: &str, loan: &str, credit: &str) -> PredictForm {
        PredictForm {
            income: income.into(),
            loan_amount: loan.into(),
            credit_history: credit.into(),
            dataset: None,
            selection: None,
        }
    }

    #[test]
    fn form_parses_features() {
        let f = form("5000", " 100 ", "1").parse_features().unwrap();
        assert_eq!(f, FeatureVector::new(5000.0, 100.0, 1).unwrap());
    }

    #[test]
    fn form_reports_bad_fields() {
        assert_eq!(
            form("abc", "100", "1").parse_features().unwrap_err(),
            "Applicant Income must be a number"
        );
        assert!(form("5000", "-1", "1").parse_features().unwrap_err().contains("loan_amount"));
        assert!(form("5000", "100", "2").parse_features().is_err());
    }

    #[test]
    fn form_context_carries_selection() {
        let mut f = form("1", "1", "0");
        f.dataset = Some(Uuid::nil().to_string());
        f.selection = Some("0,1".into());
        let (id, selection) = f.context();
        assert_eq!(id, Some(Uuid::nil()));
        assert_eq!(selection.unwrap().selected().len(), 2);

        f.dataset = Some(String::new());
        assert_eq!(f.context().0, None);

        // Encoded commas belong to the value
        f.selection = Some("Good%2C%20verified,Poor".into());
        let selected = f.context().1.unwrap();
        assert_eq!(selected.selected().len(), 2);
        assert_eq!(selected.selected()[0].to_string(), "Good, verified");
    }

    #[test]
    fn default_selection_is_every_option() {
        let data = LoanDataset::from_bytes(b"Credit_History\n1\n0\n\n1\n").unwrap();
        let (filter, filtered) = apply_selection(&data, None).unwrap();
        assert_eq!(filter.selected().len(), 2);
        assert_eq!(filtered.len(), 3);
    }
}
