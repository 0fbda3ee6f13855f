//! Application handlers.
//!
//! Command handlers that orchestrate domain operations.

pub mod billing;

pub use billing::{
    CaseInsensitiveEmailMatcher, CheckoutError, EmailSubscriberResolver,
    LinkStaleSubscriptionsHandler, PayloadSanitizer, PlanSyncError, PlanSyncHandler,
    RecordCheckoutCommand, RecordCheckoutHandler, RecordCheckoutResult, ReconcileOutcome,
    ReconcileSubscriptionHandler, StaleSubscriptionMatcher, SubscriberResolver,
};
