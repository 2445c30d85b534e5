//! Error types for the annotation engine.

use thiserror::Error;

use fceplus_dataset::DatasetError;

/// A node resembled a known pattern but lacked a required part.
///
/// Only the node being matched is affected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{matcher} did not match: {reason}")]
pub struct MatchFailure {
    pub matcher: &'static str,
    pub reason: String,
}

impl MatchFailure {
    pub fn new(matcher: &'static str, reason: impl Into<String>) -> Self {
        Self {
            matcher,
            reason: reason.into(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Invalid dataset URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Errors that can occur while processing host events.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Pattern recognized, required sub-element missing.
    #[error(transparent)]
    Match(#[from] MatchFailure),

    /// Reversal requested for a node that carries no counted annotation.
    #[error("Node was never annotated")]
    NotAnnotated,

    /// The node was counted before the last reset.
    #[error("Annotation predates the last reset (epoch {epoch})")]
    StaleAnnotation { epoch: u64 },

    /// Dataset fetch or parse failure.
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
