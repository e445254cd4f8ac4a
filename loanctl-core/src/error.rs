/// Structured error types for loanctl-core.
///
/// The server maps these onto HTTP statuses and the CLI wraps them with
/// `anyhow` context, so variants carry enough detail to be shown as-is.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for loanctl-core operations
#[derive(Error, Debug)]
pub enum LoanError {
    /// I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// CSV could not be parsed
    #[error("CSV error: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },

    /// Uploaded file had no header row
    #[error("Dataset is empty: no header row found")]
    EmptyDataset,

    /// A column the operation depends on is absent
    #[error("Missing required column '{column}'")]
    MissingColumn { column: String },

    /// Feature vector rejected before reaching the model
    #[error("Invalid feature '{field}': {reason}")]
    InvalidFeature { field: &'static str, reason: String },

    /// Model artifact could not be read or failed validation
    #[error("Invalid model artifact {path:?}: {reason}")]
    InvalidModel { path: PathBuf, reason: String },

    /// Model produced something other than a binary label
    #[error("Inference failed: {reason}")]
    Inference { reason: String },
}

/// Result type alias for loanctl-core operations
pub type Result<T> = std::result::Result<T, LoanError>;

impl LoanError {
    /// Create a missing column error
    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }

    /// Create an invalid feature error
    pub fn invalid_feature(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidFeature {
            field,
            reason: reason.into(),
        }
    }

    /// Create an invalid model error
    pub fn invalid_model(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidModel {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an inference error
    pub fn inference(reason: impl Into<String>) -> Self {
        Self::Inference {
            reason: reason.into(),
        }
    }

    /// True when the error stems from user input rather than the environment.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Csv { .. }
                | Self::EmptyDataset
                | Self::MissingColumn { .. }
                | Self::InvalidFeature { .. }
        )
    }
}
