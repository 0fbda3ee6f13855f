//! LinkStaleSubscriptionsHandler - Links orphaned subscriptions to new accounts.
//!
//! A customer can pay before they have an account. Their subscription is
//! stored with no subscriber; once the account is created the host reports
//! it here and every matching unlinked subscription is assigned to it.

use std::sync::Arc;

use super::mappers::StaleSubscriptionMatcher;
use crate::domain::foundation::{DomainError, SubscriptionId};
use crate::ports::{Subscriber, SubscriptionRepository};

pub struct LinkStaleSubscriptionsHandler {
    repository: Arc<dyn SubscriptionRepository>,
    matcher: Arc<dyn StaleSubscriptionMatcher>,
}

impl LinkStaleSubscriptionsHandler {
    pub fn new(
        repository: Arc<dyn SubscriptionRepository>,
        matcher: Arc<dyn StaleSubscriptionMatcher>,
    ) -> Self {
        Self {
            repository,
            matcher,
        }
    }

    /// Post-save hook for subscriber accounts.
    ///
    /// Does nothing unless `created` is true. Returns the number of
    /// subscriptions linked. Running it again for the same subscriber links
    /// nothing, since matched rows are no longer unlinked.
    pub async fn on_subscriber_saved(
        &self,
        subscriber: &Subscriber,
        created: bool,
    ) -> Result<u64, DomainError> {
        if !created {
            return Ok(0);
        }

        let candidates = match self.matcher.email_filter(subscriber) {
            Some(email) if email.is_empty() => return Ok(0),
            Some(email) => self.repository.find_unlinked_by_email(&email).await?,
            None => self.repository.find_unlinked().await?,
        };

        let matching: Vec<SubscriptionId> = candidates
            .into_iter()
            .filter(|subscription| self.matcher.matches(subscriber, subscription))
            .map(|subscription| subscription.id)
            .collect();

        if matching.is_empty() {
            return Ok(0);
        }

        let linked = self
            .repository
            .link_subscriber(&matching, subscriber.id)
            .await?;

        tracing::info!(
            subscriber_id = %subscriber.id,
            linked,
            "Linked stale subscriptions to new subscriber"
        );
        Ok(linked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemorySubscriptionRepository;
    use crate::application::handlers::billing::CaseInsensitiveEmailMatcher;
    use crate::domain::billing::{
        Subscription, SubscriptionFields, SubscriptionStatus, SubscriptionUpdate,
    };
    use crate::domain::foundation::{PlanId, SubscriberId};
    use chrono::Utc;

    fn subscription(id: &str, email: &str, subscriber: Option<i64>) -> Subscription {
        let update = SubscriptionUpdate {
            id: SubscriptionId::new(id).unwrap(),
            subscriber_id: subscriber.map(SubscriberId::new),
            plan_id: PlanId::new(10),
            fields: SubscriptionFields {
                email: Some(email.to_string()),
                status: Some(SubscriptionStatus::Active),
                ..Default::default()
            },
        };
        Subscription::create(&update, Utc::now()).unwrap()
    }

    fn handler(rows: Vec<Subscription>) -> (LinkStaleSubscriptionsHandler, Arc<InMemorySubscriptionRepository>) {
        let repo = Arc::new(InMemorySubscriptionRepository::with_subscriptions(rows));
        (
            LinkStaleSubscriptionsHandler::new(repo.clone(), Arc::new(CaseInsensitiveEmailMatcher)),
            repo,
        )
    }

    fn new_subscriber() -> Subscriber {
        Subscriber::new(SubscriberId::new(42), "A@X.com")
    }

    #[tokio::test]
    async fn links_matching_subscription_on_creation() {
        let (handler, repo) = handler(vec![subscription("1", "a@x.com", None)]);

        let linked = handler.on_subscriber_saved(&new_subscriber(), true).await.unwrap();

        assert_eq!(linked, 1);
        let sub = repo.find_by_id(&SubscriptionId::new("1").unwrap()).await.unwrap().unwrap();
        assert_eq!(sub.subscriber_id, Some(SubscriberId::new(42)));
    }

    #[tokio::test]
    async fn ignores_saves_that_are_not_creations() {
        let (handler, repo) = handler(vec![subscription("1", "a@x.com", None)]);

        let linked = handler.on_subscriber_saved(&new_subscriber(), false).await.unwrap();

        assert_eq!(linked, 0);
        assert_eq!(repo.find_unlinked().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn leaves_other_emails_and_linked_rows_alone() {
        let (handler, repo) = handler(vec![
            subscription("1", "a@x.com", None),
            subscription("2", "b@x.com", None),
            subscription("3", "a@x.com", Some(7)),
        ]);

        let linked = handler.on_subscriber_saved(&new_subscriber(), true).await.unwrap();

        assert_eq!(linked, 1);
        let owners: Vec<(String, Option<SubscriberId>)> = repo
            .all()
            .into_iter()
            .map(|s| (s.id.as_str().to_string(), s.subscriber_id))
            .collect();
        assert_eq!(
            owners,
            vec![
                ("1".to_string(), Some(SubscriberId::new(42))),
                ("2".to_string(), None),
                ("3".to_string(), Some(SubscriberId::new(7))),
            ]
        );
    }

    #[tokio::test]
    async fn rerun_is_a_no_op() {
        let (handler, _repo) = handler(vec![subscription("1", "a@x.com", None)]);
        handler.on_subscriber_saved(&new_subscriber(), true).await.unwrap();

        let linked = handler.on_subscriber_saved(&new_subscriber(), true).await.unwrap();

        assert_eq!(linked, 0);
    }

    /// Counts full scans of the unlinked set.
    struct ScanCounting {
        inner: InMemorySubscriptionRepository,
        full_scans: std::sync::Mutex<usize>,
    }

    #[async_trait::async_trait]
    impl SubscriptionRepository for ScanCounting {
        async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError> {
            self.inner.find_by_id(id).await
        }
        async fn insert(&self, s: &Subscription) -> Result<crate::ports::InsertOutcome, DomainError> {
            self.inner.insert(s).await
        }
        async fn update_if_newer(
            &self,
            update: &SubscriptionUpdate,
            event_time: chrono::DateTime<Utc>,
        ) -> Result<crate::ports::GuardedUpdate, DomainError> {
            self.inner.update_if_newer(update, event_time).await
        }
        async fn find_unlinked(&self) -> Result<Vec<Subscription>, DomainError> {
            *self.full_scans.lock().unwrap() += 1;
            self.inner.find_unlinked().await
        }
        async fn find_unlinked_by_email(&self, email: &str) -> Result<Vec<Subscription>, DomainError> {
            self.inner.find_unlinked_by_email(email).await
        }
        async fn link_subscriber(
            &self,
            ids: &[SubscriptionId],
            subscriber: SubscriberId,
        ) -> Result<u64, DomainError> {
            self.inner.link_subscriber(ids, subscriber).await
        }
    }

    #[tokio::test]
    async fn email_matcher_queries_by_email_instead_of_scanning() {
        let repo = Arc::new(ScanCounting {
            inner: InMemorySubscriptionRepository::with_subscriptions(vec![
                subscription("1", "A@x.com", None),
                subscription("2", "b@x.com", None),
            ]),
            full_scans: std::sync::Mutex::new(0),
        });
        let handler =
            LinkStaleSubscriptionsHandler::new(repo.clone(), Arc::new(CaseInsensitiveEmailMatcher));

        let linked = handler.on_subscriber_saved(&new_subscriber(), true).await.unwrap();

        assert_eq!(linked, 1);
        assert_eq!(*repo.full_scans.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn subscriber_without_email_links_nothing() {
        let (handler, repo) = handler(vec![subscription("1", "", None)]);

        let linked = handler
            .on_subscriber_saved(&Subscriber::new(SubscriberId::new(42), ""), true)
            .await
            .unwrap();

        assert_eq!(linked, 0);
        assert_eq!(repo.find_unlinked().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn custom_matcher_is_used() {
        struct DomainMatcher;
        impl StaleSubscriptionMatcher for DomainMatcher {
            fn matches(&self, _: &Subscriber, subscription: &Subscription) -> bool {
                subscription.email.ends_with("@x.com")
            }
        }

        let repo = Arc::new(InMemorySubscriptionRepository::with_subscriptions(vec![
            subscription("1", "a@x.com", None),
            subscription("2", "b@x.com", None),
            subscription("3", "c@y.com", None),
        ]));
        let handler = LinkStaleSubscriptionsHandler::new(repo.clone(), Arc::new(DomainMatcher));

        let linked = handler.on_subscriber_saved(&new_subscriber(), true).await.unwrap();

        assert_eq!(linked, 2);
        assert_eq!(repo.find_unlinked().await.unwrap().len(), 1);
    }
}
