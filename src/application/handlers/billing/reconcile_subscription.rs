//! ReconcileSubscriptionHandler - Applies subscription alerts to the store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use super::sanitize_payload::PayloadSanitizer;
use crate::domain::billing::{AlertName, AlertPayload, Subscription, SubscriptionUpdate, WebhookError};
use crate::ports::{AlertListener, GuardedUpdate, InsertOutcome, SubscriptionRepository};

/// What reconciling an alert did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Created,
    Updated,
    /// The stored row already reflects an event at least as new.
    Stale,
}

/// Handler for create-or-update of subscriptions from alerts.
///
/// The first alert for an id creates the row. Later alerts only apply when
/// their `event_time` is strictly newer than the stored one, so redelivered
/// or out-of-order alerts never roll state back.
pub struct ReconcileSubscriptionHandler {
    repository: Arc<dyn SubscriptionRepository>,
    sanitizer: Arc<PayloadSanitizer>,
}

impl ReconcileSubscriptionHandler {
    pub fn new(repository: Arc<dyn SubscriptionRepository>, sanitizer: Arc<PayloadSanitizer>) -> Self {
        Self {
            repository,
            sanitizer,
        }
    }

    /// Sanitize a raw alert and reconcile it.
    pub async fn handle(&self, payload: AlertPayload) -> Result<ReconcileOutcome, WebhookError> {
        let update = self.sanitizer.sanitize(payload).await?;
        self.reconcile(update).await
    }

    pub async fn reconcile(&self, update: SubscriptionUpdate) -> Result<ReconcileOutcome, WebhookError> {
        if self.repository.find_by_id(&update.id).await?.is_none() {
            if update.fields.event_time.is_none() {
                tracing::warn!(
                    subscription_id = %update.id,
                    "Alert has no event_time, using current time for new subscription"
                );
            }

            let subscription = Subscription::create(&update, Utc::now())?;
            match self.repository.insert(&subscription).await? {
                InsertOutcome::Inserted => {
                    tracing::info!(
                        subscription_id = %subscription.id,
                        status = %subscription.status,
                        plan_id = %subscription.plan_id,
                        "Created subscription"
                    );
                    return Ok(ReconcileOutcome::Created);
                }
                InsertOutcome::AlreadyExists => {
                    tracing::debug!(
                        subscription_id = %update.id,
                        "Subscription created concurrently, applying as update"
                    );
                }
            }
        }

        let event_time = update
            .fields
            .event_time
            .ok_or(WebhookError::MissingField("event_time"))?;

        match self.repository.update_if_newer(&update, event_time).await? {
            GuardedUpdate::Updated => {
                tracing::info!(
                    subscription_id = %update.id,
                    event_time = %event_time,
                    "Updated subscription"
                );
                Ok(ReconcileOutcome::Updated)
            }
            GuardedUpdate::Stale => {
                tracing::debug!(
                    subscription_id = %update.id,
                    event_time = %event_time,
                    "Discarding stale alert"
                );
                Ok(ReconcileOutcome::Stale)
            }
            GuardedUpdate::NotFound => Err(WebhookError::Database(format!(
                "subscription {} vanished during reconcile",
                update.id
            ))),
        }
    }
}

#[async_trait]
impl AlertListener for ReconcileSubscriptionHandler {
    async fn on_alert(&self, alert: AlertName, payload: &AlertPayload) -> Result<(), WebhookError> {
        let outcome = self.handle(payload.clone()).await?;
        tracing::debug!(alert_name = %alert, ?outcome, "Reconciled alert");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "ReconcileSubscription"
    }
}
