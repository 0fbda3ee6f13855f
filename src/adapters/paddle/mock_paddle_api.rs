//! Mock Paddle vendor API for testing.
//!
//! Serves a configurable plan catalog without network access. Supports
//! error injection and records every call for assertions.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::billing::PlanData;
use crate::domain::foundation::PlanId;
use crate::ports::{PaddleApi, PaddleApiError};

/// Mock Paddle API.
///
/// # Example
///
/// ```ignore
/// let api = MockPaddleApi::with_plans(vec![monthly_plan()]);
/// api.fail_next(PaddleApiError::Transport("timed out".into()));
/// ```
#[derive(Default, Clone)]
pub struct MockPaddleApi {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    plans: Vec<PlanData>,
    next_error: Option<PaddleApiError>,
    call_log: Vec<ApiCall>,
}

/// Recorded API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    ListPlans,
    GetPlan(PlanId),
}

impl MockPaddleApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plans(plans: Vec<PlanData>) -> Self {
        let mock = Self::new();
        mock.state().plans = plans;
        mock
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Replace the served catalog.
    pub fn set_plans(&self, plans: Vec<PlanData>) {
        self.state().plans = plans;
    }

    /// Fail the next call with `error`.
    pub fn fail_next(&self, error: PaddleApiError) {
        self.state().next_error = Some(error);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Assertion Helpers
    // ════════════════════════════════════════════════════════════════════════════

    pub fn calls(&self) -> Vec<ApiCall> {
        self.state().call_log.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state().call_log.len()
    }
}

#[async_trait]
impl PaddleApi for MockPaddleApi {
    async fn list_plans(&self) -> Result<Vec<PlanData>, PaddleApiError> {
        let mut state = self.state();
        state.call_log.push(ApiCall::ListPlans);
        if let Some(error) = state.next_error.take() {
            return Err(error);
        }
        Ok(state.plans.clone())
    }

    async fn get_plan(&self, id: PlanId) -> Result<Option<PlanData>, PaddleApiError> {
        let mut state = self.state();
        state.call_log.push(ApiCall::GetPlan(id));
        if let Some(error) = state.next_error.take() {
            return Err(error);
        }
        Ok(state.plans.iter().find(|plan| plan.id == id).cloned())
    }
}
