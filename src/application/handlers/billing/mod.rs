//! Billing handlers - Paddle alert processing and catalog sync.
//!
//! - `PayloadSanitizer` turns raw alerts into typed subscription updates
//! - `ReconcileSubscriptionHandler` applies them under the event-time guard
//! - `LinkStaleSubscriptionsHandler` links early payers to new accounts
//! - `PlanSyncHandler` mirrors the plan catalog
//! - `RecordCheckoutHandler` stores checkouts reported by the browser

mod link_stale_subscriptions;
mod mappers;
mod record_checkout;
mod reconcile_subscription;
mod sanitize_payload;
mod sync_plans;

pub use link_stale_subscriptions::LinkStaleSubscriptionsHandler;
pub use mappers::{
    CaseInsensitiveEmailMatcher, EmailSubscriberResolver, StaleSubscriptionMatcher,
    SubscriberResolver,
};
pub use record_checkout::{
    CheckoutError, RecordCheckoutCommand, RecordCheckoutHandler, RecordCheckoutResult,
};
pub use reconcile_subscription::{ReconcileOutcome, ReconcileSubscriptionHandler};
pub use sanitize_payload::PayloadSanitizer;
pub use sync_plans::{PlanSyncError, PlanSyncHandler};
