#![deny(warnings)]
#![allow(missing_docs)]
//! Project-level orchestration for the real-estate feasibility engine.
//!
//! This crate owns everything around the numeric core in `viab-calculator`:
//! the project record and its ingestion from stored documents of any
//! historical shape, the engine that evaluates and edits projects, the report
//! tables handed to renderers, a keyed project store and the share history
//! archive.

use tracing::{debug, instrument};

/// Engine configuration loaded from TOML and the environment
pub mod config;
/// Evaluation and editing of project records
pub mod engine;
/// Error taxonomy of the engine boundaries
pub mod error;
/// Brazilian number formatting
pub mod format;
/// Archive of share-set snapshots
pub mod history;
/// Normalization of stored documents into typed values
pub mod normalize;
/// Project record, stages and floor edits
pub mod project;
/// Flat report tables
pub mod report;
/// Keyed project store
pub mod store;

pub use config::EngineConfig;
pub use engine::FeasibilityEngine;
pub use error::{ErrorSeverity, ViabError, ViabResult};
pub use format::{format_brl, format_percent};
pub use history::{HistoryEntry, ShareHistory};
pub use project::{FloorEdit, ProjectRecord, Stage};
pub use report::FeasibilityReport;
pub use store::{InMemoryProjectStore, ProjectStore};

/// Builds an engine from an optional configuration file, applying `VIAB_*`
/// environment overrides either way.
#[instrument]
pub fn init(config_path: Option<&std::path::Path>) -> ViabResult<FeasibilityEngine> {
    let config = match config_path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default().apply_env_overrides()?,
    };
    debug!(edit_policy = ?config.redistribution.edit_policy, "Initializing feasibility engine");
    Ok(FeasibilityEngine::new(config))
}
