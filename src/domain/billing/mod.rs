//! Billing domain - Paddle alerts, plans and subscriptions.
//!
//! Pure types and rules: signature verification, payload field conversion,
//! and the shape of the records the bridge keeps in sync with Paddle.

mod alert;
mod checkout;
mod paddle_time;
mod payload;
mod php_serialize;
mod plan;
mod subscription;
mod webhook_errors;
mod webhook_verifier;

#[cfg(test)]
pub(crate) mod test_support;

pub use alert::{AlertName, UnsupportedAlert};
pub use checkout::{parse_truthy, Checkout};
pub use paddle_time::{
    format_paddle_time, parse_paddle_time, parse_utc_offset, PADDLE_DATETIME_FORMAT,
    PADDLE_DATE_FORMAT,
};
pub use payload::{AlertPayload, ALERT_NAME_FIELD, SIGNATURE_FIELD};
pub use php_serialize::serialize_string_map;
pub use plan::{BillingType, Plan, PlanData, Price};
pub use subscription::{Subscription, SubscriptionFields, SubscriptionStatus, SubscriptionUpdate};
pub use webhook_errors::WebhookError;
pub use webhook_verifier::PaddleWebhookVerifier;
