//! Error types for the presentation adapters

use text_or_entity_field::FieldError;
use thiserror::Error;

/// Result type for render operations
pub type Result<T> = std::result::Result<T, RenderError>;

#[derive(Debug, Error)]
pub enum RenderError {
    /// The entity type has no canonical URL
    #[error("no link template defined for entity type '{entity_type}'")]
    UndefinedLinkTemplate { entity_type: String },

    /// An API payload had the wrong shape
    #[error("invalid payload: {message}")]
    InvalidPayload { message: String },

    #[error(transparent)]
    Field(#[from] FieldError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RenderError {
    pub fn undefined_link_template(entity_type: impl Into<String>) -> Self {
        Self::UndefinedLinkTemplate {
            entity_type: entity_type.into(),
        }
    }

    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::InvalidPayload {
            message: message.into(),
        }
    }
}
