//! Plan repository port.
//!
//! Plans are keyed by the Paddle plan id. Their price lists are never
//! patched: every sync replaces the full set inside one transaction.

use async_trait::async_trait;

use crate::domain::billing::{Plan, Price};
use crate::domain::foundation::{DomainError, PlanId};

#[async_trait]
pub trait PlanRepository: Send + Sync {
    /// Find a plan by its Paddle id.
    async fn find_by_id(&self, id: PlanId) -> Result<Option<Plan>, DomainError>;

    /// All stored plans, ordered by id.
    async fn list(&self) -> Result<Vec<Plan>, DomainError>;

    /// Prices currently stored for a plan.
    async fn prices(&self, plan_id: PlanId) -> Result<Vec<Price>, DomainError>;

    /// Get-or-create the plan, then replace its prices.
    ///
    /// An existing plan row is left untouched; only `plan` fields of a newly
    /// created row are written. The price list is deleted and re-inserted in
    /// the same transaction, so readers never observe a plan without prices.
    /// Returns the stored plan.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn sync(&self, plan: &Plan, prices: &[Price]) -> Result<Plan, DomainError>;
}
