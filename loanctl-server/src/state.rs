//! Application state shared across handlers

use std::sync::Arc;

use tracing::{error, info};

use loanctl_core::{predict, Classifier, FeatureVector, LoanError, Prediction};

use crate::db::{PredictionRecord, PredictionStore};
use crate::sessions::DatasetStore;

/// Shared application state
pub struct AppState {
    /// Loaded once at startup, read-only afterwards
    pub model: Arc<dyn Classifier>,
    pub store: Arc<dyn PredictionStore>,
    pub datasets: DatasetStore,
}

/// A verdict plus the result of writing it to the prediction log.
#[derive(Debug, Clone)]
pub struct PredictionOutcome {
    pub prediction: Prediction,
    /// Row id on success, user-facing message on failure
    pub saved: Result<i64, String>,
}

impl AppState {
    pub fn new(
        model: Arc<dyn Classifier>,
        store: Arc<dyn PredictionStore>,
        max_datasets: usize,
    ) -> Self {
        Self {
            model,
            store,
            datasets: DatasetStore::new(max_datasets),
        }
    }

    /// Run the model, then persist the result.
    ///
    /// A failed write does not fail the request: the verdict is still
    /// returned and the error is reported alongside it.
    pub async fn predict_and_record(
        &self,
        features: FeatureVector,
    ) -> Result<PredictionOutcome, LoanError> {
        let prediction = predict(self.model.as_ref(), features)?;
        let record = PredictionRecord::from(&prediction);

        let saved = match self.store.insert(&record).await {
            Ok(id) => {
                info!(id, verdict = %prediction.verdict, "prediction saved");
                Ok(id)
            }
            Err(e) => {
                error!(error = %e, store = %self.store.describe(), "failed to save prediction");
                Err(format!("Database Error: {}", e))
            }
        };

        Ok(PredictionOutcome { prediction, saved })
    }
}
