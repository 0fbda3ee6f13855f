//! Webhook error types for Paddle alert handling.
//!
//! Status codes drive Paddle's redelivery: 2xx acknowledges, 4xx rejects
//! without retry, 5xx makes Paddle redeliver the alert later.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that occur while ingesting a webhook alert.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The `p_signature` field is missing or does not verify.
    #[error("webhook validation failed")]
    InvalidSignature,

    /// The alert carries no `alert_name`.
    #[error("'alert_name' missing")]
    MissingAlertName,

    /// The configured Paddle public key could not be parsed.
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Required field missing from the alert payload.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// A field is present but cannot be converted to its column type.
    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    /// A date field matches neither Paddle date format.
    #[error("Invalid date in '{field}': {value}")]
    InvalidDate { field: String, value: String },

    /// The Paddle vendor API failed while resolving a referenced plan.
    #[error("Provider error: {0}")]
    Provider(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(String),
}

impl WebhookError {
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        WebhookError::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if Paddle should redeliver this alert.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WebhookError::Provider(_) | WebhookError::Database(_)
        )
    }

    /// Maps the error to an HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::InvalidSignature
            | WebhookError::MissingAlertName
            | WebhookError::MissingField(_)
            | WebhookError::InvalidField { .. }
            | WebhookError::InvalidDate { .. } => StatusCode::BAD_REQUEST,

            WebhookError::InvalidPublicKey(_)
            | WebhookError::Provider(_)
            | WebhookError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<crate::domain::foundation::DomainError> for WebhookError {
    fn from(err: crate::domain::foundation::DomainError) -> Self {
        WebhookError::Database(err.to_string())
    }
}
