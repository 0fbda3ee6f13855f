use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::billing::Checkout;
use crate::domain::foundation::{CheckoutId, DomainError};
use crate::ports::CheckoutRepository;

#[derive(Default)]
pub struct InMemoryCheckoutRepository {
    rows: Mutex<HashMap<CheckoutId, Checkout>>,
}

impl InMemoryCheckoutRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn rows(&self) -> MutexGuard<'_, HashMap<CheckoutId, Checkout>> {
        self.rows.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn len(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }
}

#[async_trait]
impl CheckoutRepository for InMemoryCheckoutRepository {
    async fn upsert(&self, checkout: &Checkout) -> Result<(), DomainError> {
        self.rows().insert(checkout.id.clone(), checkout.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &CheckoutId) -> Result<Option<Checkout>, DomainError> {
        Ok(self.rows().get(id).cloned())
    }
}
