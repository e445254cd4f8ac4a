//! loanctl-core: the data and model side of the loan approval dashboard.
//!
//! Upload → filter → chart → predict. Everything here is synchronous and
//! free of I/O beyond reading files; the HTTP surface lives in
//! `loanctl-server`.

pub mod charts;
pub mod config;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod model;
pub mod prediction;
pub mod svg;

pub use charts::{ChartKind, ChartSet};
pub use config::LoanctlConfig;
pub use dataset::{Cell, LoanDataset};
pub use error::{LoanError, Result};
pub use filter::{credit_history_options, filter_by_credit_history, CreditFilter};
pub use model::{load_model, Classifier, FeatureVector, ModelArtifact};
pub use prediction::{predict, Prediction, Verdict};
