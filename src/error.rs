//! Error types for catalog loading, configuration and the CLI edge
//!
//! The query path never fails: no match, malformed special tokens and bad
//! regex/glob bodies are all reported as values. Everything here is about
//! getting a snapshot loaded and a config parsed.

use crate::catalog::MonsterId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FindError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Unknown monster {id} referenced by {context}")]
    UnknownMonster { id: MonsterId, context: String },
    #[error("Unknown series {id} referenced by monster {monster}")]
    UnknownSeries { id: u32, monster: MonsterId },
    #[error("Unknown awakening {id} referenced by monster {monster}")]
    UnknownAwakening { id: u32, monster: MonsterId },
    #[error("Duplicate monster id {0}")]
    DuplicateMonster(MonsterId),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("No catalog snapshot was ever published")]
    SnapshotUnavailable,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FindError {
    /// Stable error code for machine-readable output
    pub fn error_code(&self) -> &'static str {
        match self {
            FindError::InvalidQuery(_) => "invalid_query",
            FindError::InvalidConfig(_) => "invalid_config",
            FindError::UnknownMonster { .. } => "unknown_monster",
            FindError::UnknownSeries { .. } => "unknown_series",
            FindError::UnknownAwakening { .. } => "unknown_awakening",
            FindError::DuplicateMonster(_) => "duplicate_monster",
            FindError::NotFound(_) => "not_found",
            FindError::SnapshotUnavailable => "snapshot_unavailable",
            FindError::Io(_) => "io_error",
            FindError::Json(_) => "parse_error",
        }
    }
}

/// Checks a query coming in from the CLI or stdio loop.
///
/// The engine itself accepts anything; this only guards the outer surface
/// against empty or absurdly long input.
pub fn validate_query(query: &str) -> Result<(), FindError> {
    if query.trim().is_empty() {
        return Err(FindError::InvalidQuery("Query cannot be empty".to_string()));
    }

    if query.len() > 500 {
        return Err(FindError::InvalidQuery(
            "Query too long, maximum 500 characters".to_string(),
        ));
    }

    Ok(())
}
