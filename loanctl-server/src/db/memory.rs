//! Process-local prediction log

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::repos::{DbError, PredictionRecord, PredictionStore, StoredPrediction, MAX_RECENT};

/// In-memory `PredictionStore`. Rows are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    rows: RwLock<Vec<StoredPrediction>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl PredictionStore for MemoryStore {
    async fn insert(&self, record: &PredictionRecord) -> Result<i64, DbError> {
        let mut rows = self.rows.write().await;
        let id = rows.len() as i64 + 1;
        rows.push(StoredPrediction {
            id,
            income: record.income,
            loan_amount: record.loan_amount,
            credit_history: record.credit_history as i8,
            prediction: record.prediction.as_str().to_string(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn recent(&self, limit: u32) -> Result<Vec<StoredPrediction>, DbError> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .rev()
            .take(limit.min(MAX_RECENT) as usize)
            .cloned()
            .collect())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
