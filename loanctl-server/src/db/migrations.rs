//! Schema for the prediction log

use sqlx::MySqlPool;

use super::repos::DbError;

/// Create `loan_predictions` if it does not exist.
pub async fn run(pool: &MySqlPool) -> Result<(), DbError> {
    tracing::info!("Running loan_predictions migration...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS loan_predictions (
            id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
            income DOUBLE NOT NULL,
            loan_amount DOUBLE NOT NULL,
            credit_history TINYINT NOT NULL,
            prediction VARCHAR(16) NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
