//! PayloadSanitizer - Turns a raw subscription alert into a typed update.

use std::sync::Arc;

use chrono::FixedOffset;

use super::mappers::SubscriberResolver;
use super::sync_plans::{PlanSyncError, PlanSyncHandler};
use crate::domain::billing::{AlertPayload, SubscriptionFields, SubscriptionUpdate, WebhookError};
use crate::domain::foundation::{PlanId, SubscriptionId};
use crate::ports::PlanRepository;

/// Prefix Paddle puts on changed fields in `subscription_updated` alerts.
const UPDATED_FIELD_PREFIX: &str = "new_";

/// Maps alert fields onto subscription columns.
///
/// Steps, in order:
/// 1. `subscription_id` becomes the row id.
/// 2. The subscriber is resolved through the configured `SubscriberResolver`.
/// 3. `subscription_plan_id` is looked up locally; an unknown plan is
///    fetched from Paddle and stored before continuing.
/// 4. A `new_` prefix is stripped from keys; keys that do not name a
///    subscription column are dropped.
/// 5. Values are converted to their column types, dates in the local offset.
pub struct PayloadSanitizer {
    plans: Arc<dyn PlanRepository>,
    plan_sync: Arc<PlanSyncHandler>,
    resolver: Arc<dyn SubscriberResolver>,
    offset: FixedOffset,
}

impl PayloadSanitizer {
    pub fn new(
        plans: Arc<dyn PlanRepository>,
        plan_sync: Arc<PlanSyncHandler>,
        resolver: Arc<dyn SubscriberResolver>,
        offset: FixedOffset,
    ) -> Self {
        Self {
            plans,
            plan_sync,
            resolver,
            offset,
        }
    }

    pub async fn sanitize(&self, mut payload: AlertPayload) -> Result<SubscriptionUpdate, WebhookError> {
        let raw_id = payload
            .take("subscription_id")
            .ok_or(WebhookError::MissingField("subscription_id"))?;
        let id = SubscriptionId::new(raw_id)
            .map_err(|e| WebhookError::invalid_field("subscription_id", e.to_string()))?;

        let subscriber_id = self.resolver.resolve(&payload).await?;
        if subscriber_id.is_none() {
            tracing::warn!(
                subscription_id = %id,
                "No subscriber matches alert, leaving subscription unlinked"
            );
        }

        let raw_plan_id = payload
            .take("subscription_plan_id")
            .ok_or(WebhookError::MissingField("subscription_plan_id"))?;
        let plan_id: PlanId = raw_plan_id.parse().map_err(|_| {
            WebhookError::invalid_field(
                "subscription_plan_id",
                format!("'{}' is not an integer", raw_plan_id),
            )
        })?;
        self.ensure_plan(plan_id).await?;

        let fields = self.convert_fields(payload)?;

        Ok(SubscriptionUpdate {
            id,
            subscriber_id,
            plan_id,
            fields,
        })
    }

    async fn ensure_plan(&self, plan_id: PlanId) -> Result<(), WebhookError> {
        if self.plans.find_by_id(plan_id).await?.is_some() {
            return Ok(());
        }

        tracing::info!(plan_id = %plan_id, "Alert references unknown plan, fetching from Paddle");
        match self.plan_sync.fetch_and_sync(plan_id).await {
            Ok(Some(_)) => Ok(()),
            Ok(None) => Err(WebhookError::Provider(format!(
                "plan {} is not known to Paddle",
                plan_id
            ))),
            Err(PlanSyncError::Provider(e)) => Err(WebhookError::Provider(e.to_string())),
            Err(PlanSyncError::Storage(e)) => Err(e.into()),
        }
    }

    /// Prefixed keys are applied after plain ones, so `new_status` wins
    /// over `status` when an alert carries both.
    fn convert_fields(&self, payload: AlertPayload) -> Result<SubscriptionFields, WebhookError> {
        let (renamed, plain): (Vec<_>, Vec<_>) = payload
            .into_iter()
            .partition(|(key, _)| key.starts_with(UPDATED_FIELD_PREFIX));

        let renamed = renamed.into_iter().map(|(key, value)| {
            let stripped = key[UPDATED_FIELD_PREFIX.len()..].to_string();
            (stripped, value)
        });

        let mut fields = SubscriptionFields::default();
        for (key, value) in plain.into_iter().chain(renamed) {
            if SubscriptionFields::is_field(&key) {
                fields.set(&key, value, self.offset)?;
            }
        }
        Ok(fields)
    }
}
