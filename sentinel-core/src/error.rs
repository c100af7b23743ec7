//! Error types for location safety operations.
//!
//! Every error here is a local validation failure. None of them are fatal
//! to the process, and the caller recovers by correcting its input.

use thiserror::Error;

/// Error type for location safety operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SafetyError {
    /// A raw position reading was malformed or older than the last accepted one.
    #[error("Invalid sample: {0}")]
    InvalidSample(String),

    /// Bad parameters for a zone or sharing request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A history write would break timestamp ordering.
    #[error("Invalid entry: {0}")]
    InvalidEntry(String),

    /// Unknown zone or session reference.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration could not be read or failed validation.
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type alias for location safety operations.
pub type Result<T> = std::result::Result<T, SafetyError>;

impl From<serde_json::Error> for SafetyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for SafetyError {
    fn from(err: std::io::Error) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_sample_error_display() {
        let err = SafetyError::InvalidSample("latitude out of range".to_string());
        assert_eq!(err.to_string(), "Invalid sample: latitude out of range");
    }

    #[test]
    fn invalid_request_error_display() {
        let err = SafetyError::InvalidRequest("no contacts".to_string());
        assert_eq!(err.to_string(), "Invalid request: no contacts");
    }

    #[test]
    fn invalid_entry_error_display() {
        let err = SafetyError::InvalidEntry("timestamp precedes last entry".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid entry: timestamp precedes last entry"
        );
    }

    #[test]
    fn not_found_error_display() {
        let err = SafetyError::NotFound("zone 7".to_string());
        assert_eq!(err.to_string(), "Not found: zone 7");
    }

    #[test]
    fn config_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = SafetyError::from(json_err);
        assert!(matches!(err, SafetyError::Config(_)));
        assert!(err.to_string().starts_with("Config error: "));
    }

    #[test]
    fn config_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing file");
        let err = SafetyError::from(io_err);
        assert_eq!(err, SafetyError::Config("missing file".to_string()));
    }
}
