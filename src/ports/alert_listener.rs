//! AlertListener port - Interface for reacting to verified webhook alerts.
//!
//! Listeners are registered per alert name when the bridge starts and are
//! invoked synchronously, in registration order, before the webhook response
//! is sent.

use async_trait::async_trait;

use crate::domain::billing::{AlertName, AlertPayload, WebhookError};

/// Handler for one or more Paddle alert types.
///
/// Paddle delivers alerts at least once, so implementations should be
/// idempotent. Returning an error aborts the remaining listeners and makes
/// the webhook fail, which lets Paddle redeliver.
///
/// # Example
///
/// ```ignore
/// struct RefundNotifier { /* ... */ }
///
/// #[async_trait]
/// impl AlertListener for RefundNotifier {
///     async fn on_alert(&self, alert: AlertName, payload: &AlertPayload) -> Result<(), WebhookError> {
///         let order_id = payload.get("order_id").ok_or(WebhookError::MissingField("order_id"))?;
///         // Notify accounting...
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "RefundNotifier"
///     }
/// }
/// ```
#[async_trait]
pub trait AlertListener: Send + Sync {
    /// Process a verified alert.
    async fn on_alert(&self, alert: AlertName, payload: &AlertPayload) -> Result<(), WebhookError>;

    /// Listener name for logging.
    fn name(&self) -> &'static str;
}
