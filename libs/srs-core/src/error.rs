//! Error types for srs-core.
//!
//! Scheduling itself never fails; errors only come from configuration and
//! snapshot parsing at the edges.

use thiserror::Error;

/// Result type alias using EngineError.
pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown scheduling algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("invalid config value for {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
