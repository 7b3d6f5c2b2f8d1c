//! Command implementations
//!
//! Each submodule implements the commands for one domain. Shared helpers
//! (database opening, config loading, timestamp parsing) live here.

mod catalog;
mod cohorts;
mod core;
mod insights;
mod ledger;
mod social;

pub use catalog::{cmd_events, cmd_menu};
pub use cohorts::cmd_classify;
pub use core::{cmd_init, cmd_status};
pub use insights::cmd_insights;
pub use ledger::{cmd_import, cmd_record, cmd_transactions};
pub use social::cmd_social;

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use spark_core::{Database, EngineConfig};

/// Open the database, creating it if needed
pub fn open_db(db_path: &Path) -> Result<Database> {
    Database::new(&db_path.to_string_lossy())
        .with_context(|| format!("Failed to open database at {}", db_path.display()))
}

/// Resolve the engine config: file when given, defaults otherwise
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Invalid engine config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

/// Parse an optional `--as-of` argument, defaulting to now
pub fn parse_as_of(arg: Option<&str>) -> Result<DateTime<Utc>> {
    match arg {
        Some(raw) => raw
            .parse::<DateTime<Utc>>()
            .with_context(|| format!("Invalid --as-of timestamp {:?} (use RFC 3339)", raw)),
        None => Ok(Utc::now()),
    }
}
