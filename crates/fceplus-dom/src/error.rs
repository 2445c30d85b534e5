//! DOM error types.

use thiserror::Error;

/// Errors raised by the DOM model.
#[derive(Debug, Error)]
pub enum DomError {
    /// Selector text could not be parsed.
    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// Location string is not a valid URL.
    #[error("Invalid location: {0}")]
    InvalidLocation(#[from] url::ParseError),
}
