//! Error types for engine setup and upstream fetches.
//!
//! Searching itself is total and never produces one of these.

use crate::types::EntityKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Config JSON could not be parsed
    #[error("Failed to parse config: {0}")]
    InvalidConfig(#[source] serde_json::Error),

    /// Records JSON could not be parsed
    #[error("Failed to parse records: {0}")]
    InvalidRecords(#[source] serde_json::Error),

    /// Field spec has an empty field name or a zero weight
    #[error("Invalid field spec for {kind}: {reason}")]
    InvalidFieldSpec { kind: EntityKind, reason: String },

    #[error("Unknown entity kind: {0}")]
    UnknownKind(String),

    #[error("Engine not initialized. Call init_engine(records_json, config_json) first.")]
    NotInitialized,

    /// Remote data service failed or returned something unusable
    #[error("Failed to fetch {kind}: {message}")]
    Upstream { kind: EntityKind, message: String },
}

pub type Result<T> = std::result::Result<T, EngineError>;
