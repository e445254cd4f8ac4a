//! Repository implementations for database access

pub mod predictions;

pub use predictions::{
    DbError, MySqlStore, MAX_RECENT, PredictionRecord, PredictionRepo, PredictionStore, StoredPrediction,
};
