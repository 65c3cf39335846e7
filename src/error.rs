//! Error handling for the cotistas reconciler
//!
//! The reconciliation core returns [`CotistasError`] so callers can tell a
//! schema problem from a bad fund ID. Everything around the core (file
//! loading, CLI) uses anyhow for context chaining.

use itertools::Itertools;
use thiserror::Error;

/// Core error types for a reconciliation run
#[derive(Error, Debug)]
pub enum CotistasError {
    #[error("table '{table}' is missing required column(s): {}", .columns.iter().join(", "))]
    MissingColumns { table: String, columns: Vec<String> },

    #[error("invalid ID_FUNDO value '{value}' at row {row}")]
    InvalidFundId { row: usize, value: String },

    #[error("config error: {0}")]
    Config(String),
}

/// Result type alias for the outer layers (importers, CLI)
pub type Result<T> = anyhow::Result<T>;
