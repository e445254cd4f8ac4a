//! End-to-end dashboard flows against the router with an in-memory store.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use tower::ServiceExt;

use loanctl_core::{Classifier, FeatureVector};
use loanctl_server::db::{
    DbError, MemoryStore, PredictionRecord, PredictionStore, StoredPrediction,
};
use loanctl_server::{build_router, AppState, ServerConfig};

const LOANS_CSV: &str = "Loan_ID,ApplicantIncome,LoanAmount,Credit_History,Loan_Status\n\
LP001,5849,,1,Y\n\
LP002,4583,128,1,N\n\
LP003,3000,66,0,Y\n\
LP004,2583,120,,N\n";

/// Approves whenever credit history is good.
struct CreditRule;

impl Classifier for CreditRule {
    fn predict(&self, features: &FeatureVector) -> loanctl_core::Result<u8> {
        Ok(features.credit_history)
    }

    fn describe(&self) -> String {
        "credit rule".to_string()
    }
}

/// Store whose writes always fail.
struct DownStore;

#[async_trait]
impl PredictionStore for DownStore {
    async fn insert(&self, _record: &PredictionRecord) -> Result<i64, DbError> {
        Err(DbError::Sqlx(sqlx::Error::PoolTimedOut))
    }

    async fn recent(&self, _limit: u32) -> Result<Vec<StoredPrediction>, DbError> {
        Err(DbError::Sqlx(sqlx::Error::PoolTimedOut))
    }

    fn describe(&self) -> String {
        "down".to_string()
    }
}

fn app_with(store: Arc<dyn PredictionStore>) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(Arc::new(CreditRule), store, 4));
    (build_router(state.clone(), &ServerConfig::default()), state)
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart_upload(file_name: &str, content: &str) -> Request<Body> {
    let boundary = "loanctl-test-boundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: text/csv\r\n\r\n{c}\r\n--{b}--\r\n",
        b = boundary,
        f = file_name,
        c = content,
    );
    Request::post("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn approved_prediction_is_shown_and_logged() {
    let store = Arc::new(MemoryStore::new());
    let (app, _) = app_with(store.clone());

    let response = app
        .oneshot(form_post(
            "/predict",
            "income=5000&loan_amount=100&credit_history=1",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Loan Approved!"));
    assert!(html.contains("Good Credit History (1) and Sufficient Income (5000)"));
    assert!(html.contains("Data saved successfully to the database!"));

    let rows = store.recent(10).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].income, 5000.0);
    assert_eq!(rows[0].loan_amount, 100.0);
    assert_eq!(rows[0].credit_history, 1);
    assert_eq!(rows[0].prediction, "Approved");
}

#[tokio::test]
async fn rejected_prediction_reports_loan_amount() {
    let store = Arc::new(MemoryStore::new());
    let (app, _) = app_with(store.clone());

    let html = body_text(
        app.oneshot(form_post(
            "/predict",
            "income=1000&loan_amount=500&credit_history=0",
        ))
        .await
        .unwrap(),
    )
    .await;

    assert!(html.contains("Loan Rejected!"));
    assert!(html.contains("High Loan Amount (500)"));
    assert_eq!(store.recent(1).await.unwrap()[0].prediction, "Rejected");
}

#[tokio::test]
async fn database_failure_still_shows_verdict() {
    let (app, _) = app_with(Arc::new(DownStore));

    let response = app
        .oneshot(form_post(
            "/predict",
            "income=5000&loan_amount=100&credit_history=1",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Loan Approved!"));
    assert!(html.contains("Database Error:"));
    assert!(!html.contains("Data saved successfully"));
}

#[tokio::test]
async fn invalid_form_input_is_rejected_without_writing() {
    let store = Arc::new(MemoryStore::new());
    let (app, _) = app_with(store.clone());

    let response = app
        .oneshot(form_post(
            "/predict",
            "income=lots&loan_amount=100&credit_history=1",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("Applicant Income must be a number"));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn upload_redirects_to_dataset_view() {
    let (app, state) = app_with(Arc::new(MemoryStore::new()));

    let response = app
        .clone()
        .oneshot(multipart_upload("loans.csv", LOANS_CSV))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(location.starts_with("/?dataset="));
    assert_eq!(state.datasets.len().await, 1);

    let html = body_text(
        app.oneshot(Request::get(location.as_str()).body(Body::empty()).unwrap())
            .await
            .unwrap(),
    )
    .await;
    assert!(html.contains("Uploaded Data Preview:"));
    assert!(html.contains("loans.csv"));
    assert!(html.contains("Filtered Data</h3><p>3 rows"));
    assert!(html.contains("status.svg"));
}

#[tokio::test]
async fn filter_selection_narrows_rows() {
    let (app, state) = app_with(Arc::new(MemoryStore::new()));
    let stored = state
        .datasets
        .insert("loans.csv", loanctl_core::LoanDataset::from_bytes(LOANS_CSV.as_bytes()).unwrap())
        .await;

    let uri = format!("/?dataset={}&filter=1&credit_history=0", stored.id);
    let html = body_text(
        app.clone()
            .oneshot(Request::get(uri.as_str()).body(Body::empty()).unwrap())
            .await
            .unwrap(),
    )
    .await;
    assert!(html.contains("Filtered Data</h3><p>1 rows"));

    // Explicit empty selection keeps nothing
    let uri = format!("/?dataset={}&filter=1", stored.id);
    let html = body_text(
        app.oneshot(Request::get(uri.as_str()).body(Body::empty()).unwrap())
            .await
            .unwrap(),
    )
    .await;
    assert!(html.contains("Filtered Data</h3><p>0 rows"));
}

#[tokio::test]
async fn malformed_upload_shows_error() {
    let (app, state) = app_with(Arc::new(MemoryStore::new()));

    let response = app
        .oneshot(multipart_upload("empty.csv", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("Could not read empty.csv"));
    assert!(state.datasets.is_empty().await);
}

#[tokio::test]
async fn missing_credit_history_column_is_reported() {
    let (app, state) = app_with(Arc::new(MemoryStore::new()));
    let stored = state
        .datasets
        .insert(
            "nocredit.csv",
            loanctl_core::LoanDataset::from_bytes(b"ApplicantIncome,LoanAmount\n100,10\n").unwrap(),
        )
        .await;

    let uri = format!("/?dataset={}", stored.id);
    let response = app
        .oneshot(Request::get(uri.as_str()).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Credit_History"));
    assert!(!html.contains("Data Visualization"));
}

#[tokio::test]
async fn chart_svg_is_served() {
    let (app, state) = app_with(Arc::new(MemoryStore::new()));
    let stored = state
        .datasets
        .insert("loans.csv", loanctl_core::LoanDataset::from_bytes(LOANS_CSV.as_bytes()).unwrap())
        .await;

    let uri = format!("/charts/{}/status.svg?credit_history=1", stored.id);
    let response = app
        .clone()
        .oneshot(Request::get(uri.as_str()).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/svg+xml"
    );
    assert!(body_text(response).await.starts_with("<svg"));

    let uri = format!("/charts/{}/pie.svg", stored.id);
    let response = app
        .oneshot(Request::get(uri.as_str()).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn api_dataset_round_trip_and_unknown_id() {
    let (app, _) = app_with(Arc::new(MemoryStore::new()));

    let response = app
        .clone()
        .oneshot(
            Request::post("/api/datasets?name=loans.csv")
                .header(header::CONTENT_TYPE, "text/csv")
                .body(Body::from(LOANS_CSV))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let summary: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(summary["rows"], 4);
    assert_eq!(summary["credit_history_options"], serde_json::json!([1.0, 0.0]));

    let id = summary["id"].as_str().unwrap();
    let uri = format!("/api/datasets/{}?credit_history=1", id);
    let response = app
        .clone()
        .oneshot(Request::get(uri.as_str()).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let filtered: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(filtered["rows"].as_array().unwrap().len(), 2);

    let uri = format!("/api/datasets/{}", uuid::Uuid::new_v4());
    let response = app
        .oneshot(Request::get(uri.as_str()).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn api_predict_and_recent() {
    let store = Arc::new(MemoryStore::new());
    let (app, _) = app_with(store.clone());

    let response = app
        .clone()
        .oneshot(
            Request::post("/api/predict")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"income":5000,"loan_amount":100,"credit_history":1}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["prediction"], "Approved");
    assert_eq!(body["saved"], true);
    assert_eq!(body["id"], 1);

    let response = app
        .clone()
        .oneshot(
            Request::post("/api/predict")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"income":-1,"loan_amount":100,"credit_history":1}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(
            Request::get("/api/predictions?limit=5")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let rows: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn health_and_status() {
    let (app, _) = app_with(Arc::new(MemoryStore::new()));

    let response = app
        .clone()
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::get("/api/status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["model"], "credit rule");
    assert_eq!(body["store"], "memory");
}

async fn json_error(response: Response) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    let body = serde_json::from_str(&body_text(response).await).unwrap();
    (status, body)
}

fn json_post(uri: &str, body: &'static str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn api_malformed_input_is_json_validation_error() {
    let store = Arc::new(MemoryStore::new());
    let (app, _) = app_with(store.clone());

    for body in [
        r#"{"income":"abc","loan_amount":100,"credit_history":1}"#,
        r#"{"income":5000,"loan_amount":100,"credit_history":300}"#,
        r#"{"income":5000,"loan_amount":100}"#,
        "not json",
    ] {
        let response = app.clone().oneshot(json_post("/api/predict", body)).await.unwrap();
        let (status, error) = json_error(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
        assert_eq!(error["error"], "validation_error");
        assert!(!error["message"].as_str().unwrap().is_empty());
    }
    assert!(store.is_empty().await);

    let response = app
        .oneshot(
            Request::get("/api/predictions?limit=abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let (status, error) = json_error(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "validation_error");
    assert!(error["message"]
        .as_str()
        .unwrap()
        .starts_with("Failed to deserialize query string"));
}
