//! Application layer - Command handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::{
    CaseInsensitiveEmailMatcher, CheckoutError, EmailSubscriberResolver,
    LinkStaleSubscriptionsHandler, PayloadSanitizer, PlanSyncError, PlanSyncHandler,
    RecordCheckoutCommand, RecordCheckoutHandler, RecordCheckoutResult, ReconcileOutcome,
    ReconcileSubscriptionHandler, StaleSubscriptionMatcher, SubscriberResolver,
};
