//! HTTP adapter for the Paddle endpoints.
//!
//! - `POST /paddle/webhook/` - Signed Paddle alerts
//! - `POST /checkout/` - Checkout callbacks from Paddle.js

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::{
    handle_paddle_webhook, record_checkout, CheckoutApiError, PaddleAppState, WebhookApiError,
};
pub use routes::paddle_router;
