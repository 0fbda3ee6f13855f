//! Checkout repository port.

use async_trait::async_trait;

use crate::domain::billing::Checkout;
use crate::domain::foundation::{CheckoutId, DomainError};

#[async_trait]
pub trait CheckoutRepository: Send + Sync {
    /// Insert the checkout or overwrite the stored one with the same id.
    async fn upsert(&self, checkout: &Checkout) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &CheckoutId) -> Result<Option<Checkout>, DomainError>;
}
