//! PostgreSQL implementation of CheckoutRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::billing::Checkout;
use crate::domain::foundation::{CheckoutId, DomainError};
use crate::ports::CheckoutRepository;

pub struct PostgresCheckoutRepository {
    pool: PgPool,
}

impl PostgresCheckoutRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CheckoutRow {
    id: String,
    completed: Option<bool>,
    passthrough: Option<String>,
    email: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl TryFrom<CheckoutRow> for Checkout {
    type Error = DomainError;

    fn try_from(row: CheckoutRow) -> Result<Self, Self::Error> {
        Ok(Checkout {
            id: CheckoutId::new(row.id)
                .map_err(|e| DomainError::database(format!("Invalid checkout id: {}", e)))?,
            completed: row.completed,
            passthrough: row.passthrough,
            email: row.email,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl CheckoutRepository for PostgresCheckoutRepository {
    async fn upsert(&self, checkout: &Checkout) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO paddle_checkouts (id, completed, passthrough, email, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                completed = EXCLUDED.completed,
                passthrough = EXCLUDED.passthrough,
                email = EXCLUDED.email,
                created_at = EXCLUDED.created_at
            "#,
        )
        .bind(checkout.id.as_str())
        .bind(checkout.completed)
        .bind(&checkout.passthrough)
        .bind(&checkout.email)
        .bind(checkout.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to save checkout: {}", e)))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &CheckoutId) -> Result<Option<Checkout>, DomainError> {
        let row: Option<CheckoutRow> = sqlx::query_as(
            "SELECT id, completed, passthrough, email, created_at FROM paddle_checkouts WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch checkout: {}", e)))?;

        row.map(Checkout::try_from).transpose()
    }
}
