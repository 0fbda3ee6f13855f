//! Pluggable mapping strategies.
//!
//! Hosts decide how an alert maps to one of their accounts, and which
//! unlinked subscriptions belong to a newly created account. Both are
//! injected when the bridge is built; the defaults match on email.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::billing::{AlertPayload, Subscription};
use crate::domain::foundation::{DomainError, SubscriberId};
use crate::ports::{Subscriber, SubscriberDirectory};

/// Resolves the subscriber an alert belongs to.
#[async_trait]
pub trait SubscriberResolver: Send + Sync {
    /// Returns `None` when no subscriber matches. Errors are reserved for
    /// storage failures.
    async fn resolve(&self, payload: &AlertPayload) -> Result<Option<SubscriberId>, DomainError>;
}

/// Default resolver: exact match of the alert's `email` field.
pub struct EmailSubscriberResolver {
    directory: Arc<dyn SubscriberDirectory>,
}

impl EmailSubscriberResolver {
    pub fn new(directory: Arc<dyn SubscriberDirectory>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl SubscriberResolver for EmailSubscriberResolver {
    async fn resolve(&self, payload: &AlertPayload) -> Result<Option<SubscriberId>, DomainError> {
        let Some(email) = payload.get("email").filter(|e| !e.is_empty()) else {
            tracing::debug!("Alert has no email to resolve a subscriber from");
            return Ok(None);
        };
        Ok(self.directory.find_by_email(email).await?.map(|s| s.id))
    }
}

/// Decides whether an unlinked subscription belongs to a subscriber.
pub trait StaleSubscriptionMatcher: Send + Sync {
    fn matches(&self, subscriber: &Subscriber, subscription: &Subscription) -> bool;

    /// Email that every match must carry, compared without case.
    ///
    /// When `Some`, candidates are narrowed in storage before `matches` runs.
    /// `None` means the matcher has to see every unlinked subscription.
    fn email_filter(&self, _subscriber: &Subscriber) -> Option<String> {
        None
    }
}

/// Default matcher: case-insensitive email equality.
#[derive(Debug, Default, Clone, Copy)]
pub struct CaseInsensitiveEmailMatcher;

impl StaleSubscriptionMatcher for CaseInsensitiveEmailMatcher {
    fn matches(&self, subscriber: &Subscriber, subscription: &Subscription) -> bool {
        !subscriber.email.is_empty() && subscriber.email.to_lowercase() == subscription.email.to_lowercase()
    }

    fn email_filter(&self, subscriber: &Subscriber) -> Option<String> {
        Some(subscriber.email.to_lowercase())
    }
}
