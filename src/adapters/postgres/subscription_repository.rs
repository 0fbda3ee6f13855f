//! PostgreSQL implementation of SubscriptionRepository.
//!
//! Creation uses `INSERT ... ON CONFLICT (id) DO NOTHING`; every update is a
//! single `UPDATE ... WHERE id = $id AND event_time < $new`. Only the columns
//! present in the alert are written.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::domain::billing::{Subscription, SubscriptionStatus, SubscriptionUpdate};
use crate::domain::foundation::{DomainError, PlanId, SubscriberId, SubscriptionId};
use crate::ports::{GuardedUpdate, InsertOutcome, SubscriptionRepository};

pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, id: &SubscriptionId) -> Result<bool, DomainError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM paddle_subscriptions WHERE id = $1)")
            .bind(id.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to check subscription: {}", e)))
    }
}

/// Database row representation of a subscription.
#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: String,
    subscriber_id: Option<i64>,
    plan_id: i64,
    cancel_url: String,
    checkout_id: String,
    currency: String,
    email: String,
    event_time: DateTime<Utc>,
    marketing_consent: bool,
    next_bill_date: Option<DateTime<Utc>>,
    passthrough: String,
    quantity: i32,
    source: String,
    status: String,
    unit_price: f64,
    update_url: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let id = SubscriptionId::new(row.id)
            .map_err(|e| DomainError::database(format!("Invalid subscription id: {}", e)))?;
        let status: SubscriptionStatus = row.status.parse().map_err(|e| {
            DomainError::database(format!("Invalid status for subscription {}: {}", id, e))
        })?;

        Ok(Subscription {
            id,
            subscriber_id: row.subscriber_id.map(SubscriberId::new),
            plan_id: PlanId::new(row.plan_id),
            cancel_url: row.cancel_url,
            checkout_id: row.checkout_id,
            currency: row.currency,
            email: row.email,
            event_time: row.event_time,
            marketing_consent: row.marketing_consent,
            next_bill_date: row.next_bill_date,
            passthrough: row.passthrough,
            quantity: row.quantity,
            source: row.source,
            status,
            unit_price: row.unit_price,
            update_url: row.update_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_SUBSCRIPTION: &str = r#"
    SELECT id, subscriber_id, plan_id, cancel_url, checkout_id, currency, email,
           event_time, marketing_consent, next_bill_date, passthrough, quantity,
           source, status, unit_price, update_url, created_at, updated_at
    FROM paddle_subscriptions
"#;

/// Builds the guarded partial update for `update`.
fn guarded_update_query(
    update: &SubscriptionUpdate,
    event_time: DateTime<Utc>,
) -> QueryBuilder<'static, Postgres> {
    let fields = &update.fields;
    let mut qb = QueryBuilder::new("UPDATE paddle_subscriptions SET updated_at = NOW(), event_time = ");
    qb.push_bind(event_time);
    qb.push(", plan_id = ").push_bind(update.plan_id.as_i64());

    if let Some(subscriber) = update.subscriber_id {
        qb.push(", subscriber_id = ").push_bind(subscriber.as_i64());
    }
    if let Some(v) = &fields.cancel_url {
        qb.push(", cancel_url = ").push_bind(v.clone());
    }
    if let Some(v) = &fields.checkout_id {
        qb.push(", checkout_id = ").push_bind(v.clone());
    }
    if let Some(v) = &fields.currency {
        qb.push(", currency = ").push_bind(v.clone());
    }
    if let Some(v) = &fields.email {
        qb.push(", email = ").push_bind(v.clone());
    }
    if let Some(v) = fields.marketing_consent {
        qb.push(", marketing_consent = ").push_bind(v);
    }
    if let Some(v) = fields.next_bill_date {
        qb.push(", next_bill_date = ").push_bind(v);
    }
    if let Some(v) = &fields.passthrough {
        qb.push(", passthrough = ").push_bind(v.clone());
    }
    if let Some(v) = fields.quantity {
        qb.push(", quantity = ").push_bind(v);
    }
    if let Some(v) = &fields.source {
        qb.push(", source = ").push_bind(v.clone());
    }
    if let Some(v) = fields.status {
        qb.push(", status = ").push_bind(v.as_str());
    }
    if let Some(v) = fields.unit_price {
        qb.push(", unit_price = ").push_bind(v);
    }
    if let Some(v) = &fields.update_url {
        qb.push(", update_url = ").push_bind(v.clone());
    }

    qb.push(" WHERE id = ").push_bind(update.id.as_str().to_string());
    qb.push(" AND event_time < ").push_bind(event_time);
    qb
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> =
            sqlx::query_as(&format!("{} WHERE id = $1", SELECT_SUBSCRIPTION))
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| DomainError::database(format!("Failed to fetch subscription: {}", e)))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn insert(&self, subscription: &Subscription) -> Result<InsertOutcome, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO paddle_subscriptions (
                id, subscriber_id, plan_id, cancel_url, checkout_id, currency, email,
                event_time, marketing_consent, next_bill_date, passthrough, quantity,
                source, status, unit_price, update_url, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(subscription.id.as_str())
        .bind(subscription.subscriber_id.map(|s| s.as_i64()))
        .bind(subscription.plan_id.as_i64())
        .bind(&subscription.cancel_url)
        .bind(&subscription.checkout_id)
        .bind(&subscription.currency)
        .bind(&subscription.email)
        .bind(subscription.event_time)
        .bind(subscription.marketing_consent)
        .bind(subscription.next_bill_date)
        .bind(&subscription.passthrough)
        .bind(subscription.quantity)
        .bind(&subscription.source)
        .bind(subscription.status.as_str())
        .bind(subscription.unit_price)
        .bind(&subscription.update_url)
        .bind(subscription.created_at)
        .bind(subscription.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to insert subscription: {}", e)))?;

        Ok(if result.rows_affected() == 1 {
            InsertOutcome::Inserted
        } else {
            InsertOutcome::AlreadyExists
        })
    }

    async fn update_if_newer(
        &self,
        update: &SubscriptionUpdate,
        event_time: DateTime<Utc>,
    ) -> Result<GuardedUpdate, DomainError> {
        let result = guarded_update_query(update, event_time)
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to update subscription: {}", e)))?;

        if result.rows_affected() > 0 {
            return Ok(GuardedUpdate::Updated);
        }
        if self.exists(&update.id).await? {
            Ok(GuardedUpdate::Stale)
        } else {
            Ok(GuardedUpdate::NotFound)
        }
    }

    async fn find_unlinked(&self) -> Result<Vec<Subscription>, DomainError> {
        let rows: Vec<SubscriptionRow> = sqlx::query_as(&format!(
            "{} WHERE subscriber_id IS NULL ORDER BY created_at",
            SELECT_SUBSCRIPTION
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to list unlinked subscriptions: {}", e)))?;

        rows.into_iter().map(Subscription::try_from).collect()
    }

    async fn find_unlinked_by_email(&self, email: &str) -> Result<Vec<Subscription>, DomainError> {
        let rows: Vec<SubscriptionRow> = sqlx::query_as(&format!(
            "{} WHERE subscriber_id IS NULL AND LOWER(email) = LOWER($1) ORDER BY created_at",
            SELECT_SUBSCRIPTION
        ))
        .bind(email)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to list unlinked subscriptions: {}", e)))?;

        rows.into_iter().map(Subscription::try_from).collect()
    }

    async fn link_subscriber(
        &self,
        ids: &[SubscriptionId],
        subscriber: SubscriberId,
    ) -> Result<u64, DomainError> {
        let ids: Vec<String> = ids.iter().map(|id| id.as_str().to_string()).collect();

        let result = sqlx::query(
            r#"
            UPDATE paddle_subscriptions
            SET subscriber_id = $1, updated_at = NOW()
            WHERE id = ANY($2) AND subscriber_id IS NULL
            "#,
        )
        .bind(subscriber.as_i64())
        .bind(&ids)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to link subscriptions: {}", e)))?;

        Ok(result.rows_affected())
    }
}
