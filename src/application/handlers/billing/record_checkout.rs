//! RecordCheckoutHandler - Stores checkouts reported by Paddle.js.

use std::sync::Arc;

use axum::http::StatusCode;
use chrono::FixedOffset;
use thiserror::Error;

use crate::domain::billing::{parse_paddle_time, parse_truthy, Checkout};
use crate::domain::foundation::{CheckoutId, DomainError};
use crate::ports::CheckoutRepository;

/// Checkout form as posted by the browser. All fields are raw form values.
#[derive(Debug, Clone, Default)]
pub struct RecordCheckoutCommand {
    pub id: Option<String>,
    pub completed: Option<String>,
    pub passthrough: Option<String>,
    pub email: Option<String>,
    pub created_at: Option<String>,
    pub redirect_url: Option<String>,
    /// `next` query parameter; takes precedence over `redirect_url`.
    pub next: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordCheckoutResult {
    pub checkout: Checkout,
    /// Where the browser should go next, if the caller asked for a redirect.
    pub redirect_url: Option<String>,
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Missing \"id\"")]
    MissingId,

    #[error("Invalid \"id\": {0}")]
    InvalidId(String),

    #[error("Missing \"completed\"")]
    MissingCompleted,

    #[error("\"email\" exceeds {max} characters")]
    EmailTooLong { max: usize },

    #[error("Invalid date for \"{field}\": '{value}'")]
    InvalidDate { field: &'static str, value: String },

    #[error("Database error: {0}")]
    Database(String),
}

impl CheckoutError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CheckoutError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<DomainError> for CheckoutError {
    fn from(err: DomainError) -> Self {
        CheckoutError::Database(err.to_string())
    }
}

const MAX_EMAIL_LEN: usize = 254;

pub struct RecordCheckoutHandler {
    repository: Arc<dyn CheckoutRepository>,
    offset: FixedOffset,
}

impl RecordCheckoutHandler {
    pub fn new(repository: Arc<dyn CheckoutRepository>, offset: FixedOffset) -> Self {
        Self { repository, offset }
    }

    /// Validates the form, upserts the checkout and builds the redirect.
    ///
    /// Nothing is stored when validation fails.
    pub async fn handle(&self, cmd: RecordCheckoutCommand) -> Result<RecordCheckoutResult, CheckoutError> {
        let raw_id = cmd.id.filter(|id| !id.is_empty()).ok_or(CheckoutError::MissingId)?;
        let id = CheckoutId::new(raw_id).map_err(|e| CheckoutError::InvalidId(e.to_string()))?;

        let completed = cmd
            .completed
            .as_deref()
            .and_then(parse_truthy)
            .ok_or(CheckoutError::MissingCompleted)?;

        if cmd.email.as_ref().is_some_and(|e| e.chars().count() > MAX_EMAIL_LEN) {
            return Err(CheckoutError::EmailTooLong { max: MAX_EMAIL_LEN });
        }

        let created_at = match cmd.created_at.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(parse_paddle_time(raw, self.offset).ok_or_else(|| {
                CheckoutError::InvalidDate {
                    field: "created_at",
                    value: raw.to_string(),
                }
            })?),
        };

        let checkout = Checkout {
            id,
            completed: Some(completed),
            passthrough: cmd.passthrough,
            email: cmd.email,
            created_at,
        };
        self.repository.upsert(&checkout).await?;

        tracing::info!(checkout_id = %checkout.id, completed, "Recorded checkout");

        let redirect_url = cmd
            .next
            .filter(|url| !url.is_empty())
            .or(cmd.redirect_url.filter(|url| !url.is_empty()))
            .map(|url| format!("{}?checkout={}", url, checkout.id));

        Ok(RecordCheckoutResult {
            checkout,
            redirect_url,
        })
    }
}
