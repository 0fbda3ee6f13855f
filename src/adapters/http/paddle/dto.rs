//! Data Transfer Objects for the Paddle endpoints.
//!
//! The webhook body is deserialized straight into `AlertPayload`; only the
//! checkout endpoint and error responses need their own shapes.

use serde::{Deserialize, Serialize};

use crate::application::handlers::billing::RecordCheckoutCommand;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Form body of `POST /checkout/`, as posted by Paddle.js callbacks.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutForm {
    pub id: Option<String>,
    pub completed: Option<String>,
    pub passthrough: Option<String>,
    pub email: Option<String>,
    pub created_at: Option<String>,
    pub redirect_url: Option<String>,
}

/// Query string of `POST /checkout/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutQuery {
    pub next: Option<String>,
}

impl CheckoutForm {
    pub fn into_command(self, query: CheckoutQuery) -> RecordCheckoutCommand {
        RecordCheckoutCommand {
            id: self.id,
            completed: self.completed,
            passthrough: self.passthrough,
            email: self.email,
            created_at: self.created_at,
            redirect_url: self.redirect_url,
            next: query.next,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Where the browser should continue after a recorded checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedirectResponse {
    pub redirect_url: String,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}
