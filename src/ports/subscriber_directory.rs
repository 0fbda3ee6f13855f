//! SubscriberDirectory port - Read access to the host's account table.
//!
//! Subscribers are owned by the host application. The bridge only needs an
//! id and an email address, and a way to look accounts up by email.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, SubscriberId};

/// The slice of a host account the bridge works with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: SubscriberId,
    pub email: String,
}

impl Subscriber {
    pub fn new(id: SubscriberId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
        }
    }
}

#[async_trait]
pub trait SubscriberDirectory: Send + Sync {
    /// Find the subscriber whose email equals `email` exactly.
    async fn find_by_email(&self, email: &str) -> Result<Option<Subscriber>, DomainError>;

    async fn find_by_id(&self, id: SubscriberId) -> Result<Option<Subscriber>, DomainError>;
}
