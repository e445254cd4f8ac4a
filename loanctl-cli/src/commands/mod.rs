//! Command implementations for loanctl CLI

pub mod config;
pub mod inspect;
pub mod predict;
pub mod serve;

use std::path::Path;

use anyhow::Result;
use loanctl_core::LoanctlConfig;

pub use config::run_config;
pub use inspect::run_inspect;
pub use predict::run_predict;
pub use serve::run_serve;

/// Load config from `--config` or the default location, then the environment.
pub fn load_config(path: Option<&Path>) -> Result<LoanctlConfig> {
    match path {
        Some(path) => LoanctlConfig::load_from(path),
        None => LoanctlConfig::load(),
    }
}
