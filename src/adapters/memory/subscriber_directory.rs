use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, SubscriberId};
use crate::ports::{Subscriber, SubscriberDirectory};

#[derive(Default)]
pub struct InMemorySubscriberDirectory {
    subscribers: Mutex<Vec<Subscriber>>,
}

impl InMemorySubscriberDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subscribers(subscribers: impl IntoIterator<Item = Subscriber>) -> Self {
        Self {
            subscribers: Mutex::new(subscribers.into_iter().collect()),
        }
    }

    fn subscribers(&self) -> MutexGuard<'_, Vec<Subscriber>> {
        self.subscribers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add(&self, subscriber: Subscriber) {
        self.subscribers().push(subscriber);
    }
}

#[async_trait]
impl SubscriberDirectory for InMemorySubscriberDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<Subscriber>, DomainError> {
        Ok(self.subscribers().iter().find(|s| s.email == email).cloned())
    }

    async fn find_by_id(&self, id: SubscriberId) -> Result<Option<Subscriber>, DomainError> {
        Ok(self.subscribers().iter().find(|s| s.id == id).cloned())
    }
}
