//! PostgreSQL implementation of SubscriberDirectory.
//!
//! Reads the host application's account table. The table and email column
//! names come from configuration, so they are checked to be plain SQL
//! identifiers before they are spliced into queries.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, SubscriberId, ValidationError};
use crate::ports::{Subscriber, SubscriberDirectory};

/// Returns true for `name` or `schema.name`, each part matching
/// `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_valid_identifier(value: &str) -> bool {
    let parts: Vec<&str> = value.split('.').collect();
    parts.len() <= 2
        && parts.iter().all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

pub struct PostgresSubscriberDirectory {
    pool: PgPool,
    find_by_email_sql: String,
    find_by_id_sql: String,
}

impl PostgresSubscriberDirectory {
    /// Creates a directory over `table`, reading emails from `email_column`.
    ///
    /// # Errors
    ///
    /// `InvalidFormat` if either name is not a plain identifier.
    pub fn new(pool: PgPool, table: &str, email_column: &str) -> Result<Self, ValidationError> {
        if !is_valid_identifier(table) {
            return Err(ValidationError::invalid_format(
                "subscriber_table",
                format!("'{}' is not a valid table name", table),
            ));
        }
        if !is_valid_identifier(email_column) || email_column.contains('.') {
            return Err(ValidationError::invalid_format(
                "subscriber_email_column",
                format!("'{}' is not a valid column name", email_column),
            ));
        }

        let select = format!("SELECT id::BIGINT AS id, {col} AS email FROM {table}", col = email_column, table = table);
        Ok(Self {
            pool,
            find_by_email_sql: format!("{} WHERE {} = $1 ORDER BY id LIMIT 1", select, email_column),
            find_by_id_sql: format!("{} WHERE id = $1", select),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubscriberRow {
    id: i64,
    email: Option<String>,
}

impl From<SubscriberRow> for Subscriber {
    fn from(row: SubscriberRow) -> Self {
        Subscriber::new(SubscriberId::new(row.id), row.email.unwrap_or_default())
    }
}

#[async_trait]
impl SubscriberDirectory for PostgresSubscriberDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<Subscriber>, DomainError> {
        let row: Option<SubscriberRow> = sqlx::query_as(&self.find_by_email_sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to look up subscriber: {}", e)))?;

        Ok(row.map(Subscriber::from))
    }

    async fn find_by_id(&self, id: SubscriberId) -> Result<Option<Subscriber>, DomainError> {
        let row: Option<SubscriberRow> = sqlx::query_as(&self.find_by_id_sql)
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to fetch subscriber: {}", e)))?;

        Ok(row.map(Subscriber::from))
    }
}
