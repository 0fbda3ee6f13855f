use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::billing::{Subscription, SubscriptionUpdate};
use crate::domain::foundation::{DomainError, SubscriberId, SubscriptionId};
use crate::ports::{GuardedUpdate, InsertOutcome, SubscriptionRepository};

#[derive(Default)]
pub struct InMemorySubscriptionRepository {
    rows: Mutex<BTreeMap<SubscriptionId, Subscription>>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subscriptions(subscriptions: impl IntoIterator<Item = Subscription>) -> Self {
        let repo = Self::new();
        repo.rows()
            .extend(subscriptions.into_iter().map(|s| (s.id.clone(), s)));
        repo
    }

    fn rows(&self) -> MutexGuard<'_, BTreeMap<SubscriptionId, Subscription>> {
        self.rows.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn all(&self) -> Vec<Subscription> {
        self.rows().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        Ok(self.rows().get(id).cloned())
    }

    async fn insert(&self, subscription: &Subscription) -> Result<InsertOutcome, DomainError> {
        let mut rows = self.rows();
        if rows.contains_key(&subscription.id) {
            return Ok(InsertOutcome::AlreadyExists);
        }
        rows.insert(subscription.id.clone(), subscription.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn update_if_newer(
        &self,
        update: &SubscriptionUpdate,
        event_time: DateTime<Utc>,
    ) -> Result<GuardedUpdate, DomainError> {
        let mut rows = self.rows();
        let Some(row) = rows.get_mut(&update.id) else {
            return Ok(GuardedUpdate::NotFound);
        };
        if row.event_time >= event_time {
            return Ok(GuardedUpdate::Stale);
        }

        row.merge(update, Utc::now());
        row.event_time = event_time;
        Ok(GuardedUpdate::Updated)
    }

    async fn find_unlinked(&self) -> Result<Vec<Subscription>, DomainError> {
        Ok(self
            .rows()
            .values()
            .filter(|s| s.subscriber_id.is_none())
            .cloned()
            .collect())
    }

    async fn find_unlinked_by_email(&self, email: &str) -> Result<Vec<Subscription>, DomainError> {
        let email = email.to_lowercase();
        Ok(self
            .rows()
            .values()
            .filter(|s| s.subscriber_id.is_none() && s.email.to_lowercase() == email)
            .cloned()
            .collect())
    }

    async fn link_subscriber(
        &self,
        ids: &[SubscriptionId],
        subscriber: SubscriberId,
    ) -> Result<u64, DomainError> {
        let mut rows = self.rows();
        let mut linked = 0;
        for id in ids {
            if let Some(row) = rows.get_mut(id) {
                if row.subscriber_id.is_none() {
                    row.subscriber_id = Some(subscriber);
                    row.updated_at = Utc::now();
                    linked += 1;
                }
            }
        }
        Ok(linked)
    }
}
