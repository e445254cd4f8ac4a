//! loanctl-server: HTTP dashboard and JSON API
//!
//! Upload a CSV of loan applications, filter it by credit history, view
//! charts, and run the approval model. Every prediction is written to the
//! `loan_predictions` table.

pub mod db;
pub mod http;
pub mod sessions;
pub mod state;

pub use http::server::ServerError;
pub use http::{build_router, run_server, ServerConfig};
pub use sessions::{DatasetStore, StoredDataset};
pub use state::{AppState, PredictionOutcome};
