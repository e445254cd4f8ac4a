//! Database connection pool management
//!
//! Uses a sqlx MySqlPool with explicit connection limits.

use std::time::Duration;

use sqlx::mysql::MySqlPoolOptions;
use sqlx::MySqlPool;

/// Default maximum connections for the pool.
/// Kept low: one write per button press.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// How long a request waits for a connection before the write fails.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Create a MySQL connection pool.
///
/// The pool connects lazily: no connection is opened until the first query,
/// so an unreachable database only surfaces as a failed write.
///
/// # Errors
///
/// Returns an error if the URL cannot be parsed.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool("mysql://root@localhost/loan_db")?;
/// ```
pub fn create_pool(database_url: &str) -> Result<MySqlPool, sqlx::Error> {
    create_pool_with_options(database_url, DEFAULT_MAX_CONNECTIONS)
}

/// Create a MySQL connection pool with custom options.
pub fn create_pool_with_options(
    database_url: &str,
    max_connections: u32,
) -> Result<MySqlPool, sqlx::Error> {
    MySqlPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_lazy(database_url)
}
