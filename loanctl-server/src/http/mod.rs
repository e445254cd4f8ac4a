//! HTTP server layer
//!
//! Axum server with:
//! - Server-rendered dashboard (upload, filter, charts, predict)
//! - JSON API under /api
//! - CORS (localhost only by default), request tracing, timeouts
//! - Graceful shutdown

pub mod error;
pub mod extractors;
pub mod routes;
pub mod server;
pub mod view;

pub use error::ApiError;
pub use server::{build_router, run_server, ServerConfig};
