//! Axum router configuration for the Paddle endpoints.

use axum::routing::post;
use axum::Router;

use super::handlers::{handle_paddle_webhook, record_checkout, PaddleAppState};

/// Create the Paddle router.
///
/// # Routes
///
/// ## Webhook (no auth, signature verified)
/// - `POST /paddle/webhook/` - Receive Paddle alerts
///
/// ## Browser callback
/// - `POST /checkout/` - Record a completed Paddle.js checkout
///
/// # Example
///
/// ```ignore
/// let app = Router::new()
///     .merge(paddle_router())
///     .with_state(state);
/// ```
pub fn paddle_router() -> Router<PaddleAppState> {
    Router::new()
        .route("/paddle/webhook/", post(handle_paddle_webhook))
        .route("/checkout/", post(record_checkout))
}
