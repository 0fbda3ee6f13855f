//! Subscription repository port.
//!
//! The reconcile path relies on two atomic statements rather than a
//! read-then-write: an insert that does nothing on conflict, and an update
//! guarded by the stored `event_time`. Two alerts for the same subscription
//! racing each other can therefore never overwrite newer state.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::billing::{Subscription, SubscriptionUpdate};
use crate::domain::foundation::{DomainError, SubscriberId, SubscriptionId};

/// Result of an insert attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A row with the same id already existed; nothing was written.
    AlreadyExists,
}

/// Result of a guarded update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardedUpdate {
    Updated,
    /// The stored row is as new or newer than the update.
    Stale,
    NotFound,
}

#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Find a subscription by its Paddle id.
    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError>;

    /// Insert a new row unless one with the same id exists.
    async fn insert(&self, subscription: &Subscription) -> Result<InsertOutcome, DomainError>;

    /// Merge the fields present in `update` onto the stored row, but only if
    /// the stored `event_time` is strictly older than `event_time`.
    ///
    /// The comparison and the write happen in one statement. The subscriber
    /// link is only overwritten when the update resolved a subscriber.
    async fn update_if_newer(
        &self,
        update: &SubscriptionUpdate,
        event_time: DateTime<Utc>,
    ) -> Result<GuardedUpdate, DomainError>;

    /// Subscriptions with no linked subscriber.
    async fn find_unlinked(&self) -> Result<Vec<Subscription>, DomainError>;

    /// Unlinked subscriptions whose email equals `email`, ignoring case.
    async fn find_unlinked_by_email(&self, email: &str) -> Result<Vec<Subscription>, DomainError>;

    /// Link the given subscriptions to a subscriber.
    ///
    /// Rows that are already linked are skipped. Returns the number of rows
    /// changed.
    async fn link_subscriber(
        &self,
        ids: &[SubscriptionId],
        subscriber: SubscriberId,
    ) -> Result<u64, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_repository_object_safe(_: &dyn SubscriptionRepository) {}
}
