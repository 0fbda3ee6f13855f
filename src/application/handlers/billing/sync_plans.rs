//! PlanSyncHandler - Mirrors the Paddle plan catalog into the plan store.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::billing::{Plan, PlanData};
use crate::domain::foundation::{DomainError, PlanId};
use crate::ports::{PaddleApi, PaddleApiError, PlanRepository};

/// Errors from a plan sync.
#[derive(Debug, Error)]
pub enum PlanSyncError {
    #[error(transparent)]
    Provider(#[from] PaddleApiError),

    #[error(transparent)]
    Storage(#[from] DomainError),
}

/// Handler for plan catalog synchronization.
///
/// Plans follow get-or-create semantics: a plan that already exists keeps
/// its stored name and billing fields. Prices are always replaced.
pub struct PlanSyncHandler {
    plans: Arc<dyn PlanRepository>,
    api: Arc<dyn PaddleApi>,
}

impl PlanSyncHandler {
    pub fn new(plans: Arc<dyn PlanRepository>, api: Arc<dyn PaddleApi>) -> Self {
        Self { plans, api }
    }

    /// Store one plan as delivered by Paddle and replace its prices.
    pub async fn sync_plan(&self, data: PlanData) -> Result<Plan, DomainError> {
        let prices = data.prices();
        let plan = self.plans.sync(&data.plan(), &prices).await?;

        tracing::info!(plan_id = %plan.id, prices = prices.len(), "Synced Paddle plan");
        Ok(plan)
    }

    /// Sync every plan Paddle lists. Stops at the first failure.
    pub async fn sync_all(&self) -> Result<Vec<Plan>, PlanSyncError> {
        let catalog = self.api.list_plans().await?;
        let mut synced = Vec::with_capacity(catalog.len());
        for data in catalog {
            synced.push(self.sync_plan(data).await?);
        }

        tracing::info!(count = synced.len(), "Synced Paddle plan catalog");
        Ok(synced)
    }

    /// Fetch a single plan from Paddle and store it.
    ///
    /// Returns `None` when Paddle does not know the plan.
    pub async fn fetch_and_sync(&self, id: PlanId) -> Result<Option<Plan>, PlanSyncError> {
        match self.api.get_plan(id).await? {
            Some(data) => Ok(Some(self.sync_plan(data).await?)),
            None => {
                tracing::warn!(plan_id = %id, "Plan not found at Paddle");
                Ok(None)
            }
        }
    }
}
