//! PaddleApi port - Read access to the Paddle vendor API.
//!
//! Only the plan catalog is needed: full syncs list every plan, and webhook
//! processing fetches a single plan when an alert references one that is not
//! stored locally yet.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::billing::PlanData;
use crate::domain::foundation::PlanId;

/// Port for the Paddle vendor API.
#[async_trait]
pub trait PaddleApi: Send + Sync {
    /// List every subscription plan of the vendor account.
    async fn list_plans(&self) -> Result<Vec<PlanData>, PaddleApiError>;

    /// Fetch a single plan.
    ///
    /// Returns `None` if Paddle does not know the plan.
    async fn get_plan(&self, id: PlanId) -> Result<Option<PlanData>, PaddleApiError>;
}

/// Errors from the Paddle vendor API.
///
/// `Provider` is a business error Paddle reported inside a well-formed
/// envelope; `MalformedResponse` means the envelope itself was unusable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PaddleApiError {
    /// Connection, TLS or timeout failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-2xx HTTP status.
    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    /// Paddle answered with an `error` object.
    #[error("API error code {code} - {message}")]
    Provider { code: i64, message: String },

    /// The body was not JSON, or the `response` key was missing.
    #[error("malformed API response: {0}")]
    MalformedResponse(String),
}

impl PaddleApiError {
    /// Whether a later attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            PaddleApiError::Transport(_) => true,
            PaddleApiError::Status { status, .. } => *status >= 500 || *status == 429,
            PaddleApiError::Provider { .. } | PaddleApiError::MalformedResponse(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_api_object_safe(_: &dyn PaddleApi) {}

    #[test]
    fn provider_error_displays_code_and_message() {
        let err = PaddleApiError::Provider {
            code: 107,
            message: "You don't have permission to access this resource".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API error code 107 - You don't have permission to access this resource"
        );
    }

    #[test]
    fn malformed_response_displays_reason() {
        let err = PaddleApiError::MalformedResponse("\"response\" missing.".to_string());
        assert_eq!(err.to_string(), "malformed API response: \"response\" missing.");
    }

    #[test]
    fn transport_and_server_errors_are_retryable() {
        assert!(PaddleApiError::Transport("timed out".to_string()).is_retryable());
        assert!(PaddleApiError::Status { status: 503, body: String::new() }.is_retryable());
        assert!(PaddleApiError::Status { status: 429, body: String::new() }.is_retryable());
    }

    #[test]
    fn client_and_business_errors_are_not_retryable() {
        assert!(!PaddleApiError::Status { status: 403, body: String::new() }.is_retryable());
        assert!(!PaddleApiError::Provider { code: 100, message: String::new() }.is_retryable());
        assert!(!PaddleApiError::MalformedResponse(String::new()).is_retryable());
    }
}
