//! Activation email log repository.
//!
//! Append-only; the only read is the rolling window count behind the
//! activation rate limit.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use roadcall_core::CustomerId;

use super::RepositoryError;

/// Repository for the activation email log.
pub struct ActivationEmailRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ActivationEmailRepository<'a> {
    /// Create a new activation email repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Count activation messages issued to a customer since `since`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_since(
        &self,
        customer_id: CustomerId,
        since: DateTime<Utc>,
    ) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*)
            FROM activation_email
            WHERE customer_id = $1 AND issued_at >= $2
            ",
        )
        .bind(customer_id)
        .bind(since)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Append a log row for an issued activation message.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn record(
        &self,
        customer_id: CustomerId,
        requester_ip: &str,
        user_agent: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO activation_email (customer_id, issued_at, requester_ip, user_agent)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(customer_id)
        .bind(issued_at)
        .bind(requester_ip)
        .bind(user_agent)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
