//! Error types for text-or-entity fields

use thiserror::Error;

/// Result type for field operations
pub type Result<T> = std::result::Result<T, FieldError>;

/// Errors that can occur when building, configuring, or decoding field values.
///
/// Unresolvable references are not errors; lookups report them as absent.
#[derive(Debug, Error)]
pub enum FieldError {
    /// Input had the wrong shape for the operation
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Both representations were supplied for one item
    #[error("the target_id and text properties should not be both set")]
    BothSet,

    /// A setting failed validation after loading
    #[error("invalid value for setting '{key}': {message}")]
    InvalidSetting { key: String, message: String },

    /// Configuration could not be loaded or extracted
    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl FieldError {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an invalid setting error
    pub fn invalid_setting(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSetting {
            key: key.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FieldError::invalid_argument("default value is an array");
        assert_eq!(err.to_string(), "invalid argument: default value is an array");
    }

    #[test]
    fn test_invalid_setting() {
        let err = FieldError::invalid_setting("max_length", "must be at least 1");
        assert!(err.to_string().contains("max_length"));
        assert!(err.to_string().contains("must be at least 1"));
    }

    #[test]
    fn test_both_set_message() {
        assert!(FieldError::BothSet.to_string().contains("both set"));
    }
}
