//! Database layer - connection pool, migrations and the prediction log
//!
//! - Pool is created lazily so the dashboard starts while the database is down
//! - Writes go through the `PredictionStore` trait so handlers never see sqlx
//! - `MemoryStore` backs `serve --ephemeral` and the router tests

pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repos;

pub use memory::MemoryStore;
pub use pool::{create_pool, create_pool_with_options};
pub use repos::*;
