use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::billing::{Plan, Price};
use crate::domain::foundation::{DomainError, PlanId};
use crate::ports::PlanRepository;

#[derive(Default)]
pub struct InMemoryPlanRepository {
    inner: Mutex<State>,
}

#[derive(Default)]
struct State {
    plans: BTreeMap<PlanId, Plan>,
    prices: Vec<Price>,
}

impl InMemoryPlanRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a plan without prices.
    pub fn with_plan(plan: Plan) -> Self {
        let repo = Self::new();
        repo.state().plans.insert(plan.id, plan);
        repo
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Every stored price, across plans.
    pub fn all_prices(&self) -> Vec<Price> {
        self.state().prices.clone()
    }
}

#[async_trait]
impl PlanRepository for InMemoryPlanRepository {
    async fn find_by_id(&self, id: PlanId) -> Result<Option<Plan>, DomainError> {
        Ok(self.state().plans.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Plan>, DomainError> {
        Ok(self.state().plans.values().cloned().collect())
    }

    async fn prices(&self, plan_id: PlanId) -> Result<Vec<Price>, DomainError> {
        Ok(self
            .state()
            .prices
            .iter()
            .filter(|p| p.plan_id == plan_id)
            .cloned()
            .collect())
    }

    async fn sync(&self, plan: &Plan, prices: &[Price]) -> Result<Plan, DomainError> {
        let mut state = self.state();
        let stored = state
            .plans
            .entry(plan.id)
            .or_insert_with(|| plan.clone())
            .clone();

        state.prices.retain(|p| p.plan_id != plan.id);
        state.prices.extend(prices.iter().map(|p| Price {
            plan_id: plan.id,
            ..p.clone()
        }));

        Ok(stored)
    }
}
