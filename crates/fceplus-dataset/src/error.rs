//! Dataset errors.

use thiserror::Error;

/// Errors raised while loading the reference dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Transport failure (connection, timeout, body read).
    #[error("Network error: {0}")]
    Network(String),

    /// Server answered with a non-success status.
    #[error("Unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    /// Payload is not valid JSON or not a JSON object.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Dataset URL could not be parsed.
    #[error("Invalid dataset URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Local dataset file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for DatasetError {
    fn from(e: reqwest::Error) -> Self {
        DatasetError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for DatasetError {
    fn from(e: serde_json::Error) -> Self {
        DatasetError::Parse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = DatasetError::Status {
            status: 404,
            url: "https://example.com/fce.json".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("404"));
        assert!(display.contains("fce.json"));
    }

    #[test]
    fn test_json_error_maps_to_parse() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = DatasetError::from(json_err);
        assert!(matches!(err, DatasetError::Parse(_)));
    }

    #[test]
    fn test_url_error_from() {
        let url_err = url::Url::parse("::not a url").unwrap_err();
        let err = DatasetError::from(url_err);
        assert!(err.to_string().contains("Invalid dataset URL"));
    }
}
