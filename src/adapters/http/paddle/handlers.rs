//! HTTP handlers for the Paddle endpoints.
//!
//! These handlers connect Axum routes to the verifier, the alert
//! dispatcher and the checkout recorder.

use std::sync::Arc;

use axum::extract::{Form, Json, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::FixedOffset;

use crate::adapters::events::{AlertDispatcher, DispatchOutcome};
use crate::application::handlers::billing::{CheckoutError, RecordCheckoutHandler};
use crate::domain::billing::{AlertPayload, PaddleWebhookVerifier, WebhookError};
use crate::ports::CheckoutRepository;

use super::dto::{CheckoutForm, CheckoutQuery, ErrorResponse, RedirectResponse};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the Paddle routes.
#[derive(Clone)]
pub struct PaddleAppState {
    pub verifier: Arc<PaddleWebhookVerifier>,
    pub dispatcher: Arc<AlertDispatcher>,
    pub checkout_repository: Arc<dyn CheckoutRepository>,
    pub time_offset: FixedOffset,
}

impl PaddleAppState {
    pub fn new(
        verifier: Arc<PaddleWebhookVerifier>,
        dispatcher: Arc<AlertDispatcher>,
        checkout_repository: Arc<dyn CheckoutRepository>,
        time_offset: FixedOffset,
    ) -> Self {
        Self {
            verifier,
            dispatcher,
            checkout_repository,
            time_offset,
        }
    }

    pub fn record_checkout_handler(&self) -> RecordCheckoutHandler {
        RecordCheckoutHandler::new(self.checkout_repository.clone(), self.time_offset)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /paddle/webhook/ - Receive a Paddle alert
///
/// Verifies the signature over every field, then fans the alert out to the
/// registered listeners. Unrecognized alert names are acknowledged.
pub async fn handle_paddle_webhook(
    State(state): State<PaddleAppState>,
    Form(payload): Form<AlertPayload>,
) -> Result<StatusCode, WebhookApiError> {
    if !state.verifier.verify(&payload) {
        return Err(WebhookError::InvalidSignature.into());
    }

    let alert_name = payload
        .alert_name()
        .ok_or(WebhookError::MissingAlertName)?
        .to_string();

    match state.dispatcher.dispatch(&alert_name, &payload).await? {
        DispatchOutcome::Dispatched(listeners) => {
            tracing::info!(alert_name = %alert_name, listeners, "Processed Paddle alert");
        }
        DispatchOutcome::Ignored => {
            tracing::info!(alert_name = %alert_name, "Acknowledged unsupported Paddle alert");
        }
    }

    Ok(StatusCode::OK)
}

/// POST /checkout/ - Record a checkout reported by Paddle.js
pub async fn record_checkout(
    State(state): State<PaddleAppState>,
    Query(query): Query<CheckoutQuery>,
    Form(form): Form<CheckoutForm>,
) -> Result<Response, CheckoutApiError> {
    let handler = state.record_checkout_handler();
    let result = handler.handle(form.into_command(query)).await?;

    Ok(match result.redirect_url {
        Some(redirect_url) => (StatusCode::OK, Json(RedirectResponse { redirect_url })).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts webhook errors to HTTP responses.
#[derive(Debug)]
pub struct WebhookApiError(WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> Response {
        let error_code = match &self.0 {
            WebhookError::InvalidSignature => "INVALID_SIGNATURE",
            WebhookError::MissingAlertName => "MISSING_ALERT_NAME",
            WebhookError::MissingField(_)
            | WebhookError::InvalidField { .. }
            | WebhookError::InvalidDate { .. } => "VALIDATION_FAILED",
            WebhookError::Provider(_) => "PROVIDER_ERROR",
            WebhookError::InvalidPublicKey(_) | WebhookError::Database(_) => "INTERNAL_ERROR",
        };

        let status = self.0.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Paddle alert failed, expecting redelivery");
        } else {
            tracing::warn!(error = %self.0, "Rejected Paddle alert");
        }

        let body = ErrorResponse::new(error_code, self.0.to_string());
        (status, Json(body)).into_response()
    }
}

/// API error type for the checkout endpoint.
#[derive(Debug)]
pub struct CheckoutApiError(CheckoutError);

impl From<CheckoutError> for CheckoutApiError {
    fn from(err: CheckoutError) -> Self {
        Self(err)
    }
}

impl IntoResponse for CheckoutApiError {
    fn into_response(self) -> Response {
        let error_code = match &self.0 {
            CheckoutError::Database(_) => "INTERNAL_ERROR",
            _ => "VALIDATION_FAILED",
        };
        let body = ErrorResponse::new(error_code, self.0.to_string());
        (self.0.status_code(), Json(body)).into_response()
    }
}
