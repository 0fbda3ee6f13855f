//! PostgreSQL implementation of PlanRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::domain::billing::{BillingType, Plan, Price};
use crate::domain::foundation::{DomainError, PlanId};
use crate::ports::PlanRepository;

pub struct PostgresPlanRepository {
    pool: PgPool,
}

impl PostgresPlanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PlanRow {
    id: i64,
    name: String,
    billing_type: String,
    billing_period: i32,
    trial_days: i32,
    #[allow(dead_code)]
    created_at: DateTime<Utc>,
}

impl TryFrom<PlanRow> for Plan {
    type Error = DomainError;

    fn try_from(row: PlanRow) -> Result<Self, Self::Error> {
        let billing_type: BillingType = row.billing_type.parse().map_err(|e| {
            DomainError::database(format!("Invalid billing_type for plan {}: {}", row.id, e))
        })?;

        Ok(Plan {
            id: PlanId::new(row.id),
            name: row.name,
            billing_type,
            billing_period: row.billing_period,
            trial_days: row.trial_days,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PriceRow {
    plan_id: i64,
    currency: String,
    quantity: f64,
    recurring: bool,
}

impl From<PriceRow> for Price {
    fn from(row: PriceRow) -> Self {
        Price {
            plan_id: PlanId::new(row.plan_id),
            currency: row.currency,
            quantity: row.quantity,
            recurring: row.recurring,
        }
    }
}

const SELECT_PLAN: &str = r#"
    SELECT id, name, billing_type, billing_period, trial_days, created_at
    FROM paddle_plans
"#;

#[async_trait]
impl PlanRepository for PostgresPlanRepository {
    async fn find_by_id(&self, id: PlanId) -> Result<Option<Plan>, DomainError> {
        let row: Option<PlanRow> = sqlx::query_as(&format!("{} WHERE id = $1", SELECT_PLAN))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to fetch plan: {}", e)))?;

        row.map(Plan::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<Plan>, DomainError> {
        let rows: Vec<PlanRow> = sqlx::query_as(&format!("{} ORDER BY id", SELECT_PLAN))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to list plans: {}", e)))?;

        rows.into_iter().map(Plan::try_from).collect()
    }

    async fn prices(&self, plan_id: PlanId) -> Result<Vec<Price>, DomainError> {
        let rows: Vec<PriceRow> = sqlx::query_as(
            r#"
            SELECT plan_id, currency, quantity, recurring
            FROM paddle_prices
            WHERE plan_id = $1
            ORDER BY recurring, currency
            "#,
        )
        .bind(plan_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch prices: {}", e)))?;

        Ok(rows.into_iter().map(Price::from).collect())
    }

    async fn sync(&self, plan: &Plan, prices: &[Price]) -> Result<Plan, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database(format!("Failed to begin transaction: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO paddle_plans (id, name, billing_type, billing_period, trial_days)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(plan.id.as_i64())
        .bind(&plan.name)
        .bind(plan.billing_type.as_str())
        .bind(plan.billing_period)
        .bind(plan.trial_days)
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to save plan: {}", e)))?;

        let stored: PlanRow = sqlx::query_as(&format!("{} WHERE id = $1", SELECT_PLAN))
            .bind(plan.id.as_i64())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| DomainError::database(format!("Failed to reload plan: {}", e)))?;

        sqlx::query("DELETE FROM paddle_prices WHERE plan_id = $1")
            .bind(plan.id.as_i64())
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::database(format!("Failed to clear prices: {}", e)))?;

        if !prices.is_empty() {
            let mut insert: QueryBuilder<Postgres> =
                QueryBuilder::new("INSERT INTO paddle_prices (plan_id, currency, quantity, recurring) ");
            insert.push_values(prices, |mut row, price| {
                row.push_bind(plan.id.as_i64())
                    .push_bind(price.currency.clone())
                    .push_bind(price.quantity)
                    .push_bind(price.recurring);
            });
            insert
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| DomainError::database(format!("Failed to save prices: {}", e)))?;
        }

        tx.commit()
            .await
            .map_err(|e| DomainError::database(format!("Failed to commit plan sync: {}", e)))?;

        Plan::try_from(stored)
    }
}
