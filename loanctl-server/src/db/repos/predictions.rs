//! Prediction log repository
//!
//! One row per prediction: the three model inputs and the verdict text.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, MySqlPool};

use loanctl_core::{Prediction, Verdict};

/// Maximum rows returned by `recent`.
pub const MAX_RECENT: u32 = 500;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Row to insert into `loan_predictions`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionRecord {
    pub income: f64,
    pub loan_amount: f64,
    pub credit_history: u8,
    pub prediction: Verdict,
}

impl From<&Prediction> for PredictionRecord {
    fn from(p: &Prediction) -> Self {
        Self {
            income: p.features.income,
            loan_amount: p.features.loan_amount,
            credit_history: p.features.credit_history,
            prediction: p.verdict,
        }
    }
}

/// Row read back from `loan_predictions`.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct StoredPrediction {
    pub id: i64,
    pub income: f64,
    pub loan_amount: f64,
    pub credit_history: i8,
    pub prediction: String,
    pub created_at: DateTime<Utc>,
}

/// Where predictions are persisted.
#[async_trait]
pub trait PredictionStore: Send + Sync {
    /// Insert one row, returning its id.
    async fn insert(&self, record: &PredictionRecord) -> Result<i64, DbError>;

    /// Most recent rows first, at most `limit` (capped at `MAX_RECENT`).
    async fn recent(&self, limit: u32) -> Result<Vec<StoredPrediction>, DbError>;

    /// Short description for logs and the status endpoint.
    fn describe(&self) -> String;
}

/// Prediction repository
pub struct PredictionRepo<'a> {
    pool: &'a MySqlPool,
}

impl<'a> PredictionRepo<'a> {
    pub fn new(pool: &'a MySqlPool) -> Self {
        Self { pool }
    }

    /// Insert a prediction and return the generated id.
    pub async fn insert(&self, record: &PredictionRecord) -> Result<i64, DbError> {
        let result = sqlx::query(
            r#"
            INSERT INTO loan_predictions (income, loan_amount, credit_history, prediction)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(record.income)
        .bind(record.loan_amount)
        .bind(record.credit_history as i8)
        .bind(record.prediction.as_str())
        .execute(self.pool)
        .await?;

        Ok(result.last_insert_id() as i64)
    }

    /// List the latest predictions, newest first.
    pub async fn recent(&self, limit: u32) -> Result<Vec<StoredPrediction>, DbError> {
        let rows: Vec<StoredPrediction> = sqlx::query_as(
            r#"
            SELECT id, income, loan_amount, credit_history, prediction, created_at
            FROM loan_predictions
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(limit.min(MAX_RECENT))
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}

/// `PredictionStore` over a MySQL pool.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

#[async_trait]
impl PredictionStore for MySqlStore {
    async fn insert(&self, record: &PredictionRecord) -> Result<i64, DbError> {
        PredictionRepo::new(&self.pool).insert(record).await
    }

    async fn recent(&self, limit: u32) -> Result<Vec<StoredPrediction>, DbError> {
        PredictionRepo::new(&self.pool).recent(limit).await
    }

    fn describe(&self) -> String {
        "mysql".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loanctl_core::FeatureVector;

    #[test]
    fn record_from_prediction() {
        let prediction = Prediction {
            features: FeatureVector::new(5000.0, 100.0, 1).unwrap(),
            label: 1,
            verdict: Verdict::Approved,
        };
        let record = PredictionRecord::from(&prediction);
        assert_eq!(record.income, 5000.0);
        assert_eq!(record.loan_amount, 100.0);
        assert_eq!(record.credit_history, 1);
        assert_eq!(record.prediction.as_str(), "Approved");
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn insert_then_read_back() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).unwrap();
        crate::db::migrations::run(&pool).await.unwrap();

        let store = MySqlStore::new(pool);
        let id = store
            .insert(&PredictionRecord {
                income: 5000.0,
                loan_amount: 100.0,
                credit_history: 1,
                prediction: Verdict::Approved,
            })
            .await
            .unwrap();

        let rows = store.recent(10).await.unwrap();
        let row = rows.iter().find(|r| r.id == id).expect("inserted row");
        assert_eq!(row.prediction, "Approved");
        assert_eq!(row.credit_history, 1);
    }
}
