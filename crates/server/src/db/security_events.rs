//! Security event repository.

use sqlx::PgPool;

use roadcall_core::CustomerId;

use super::RepositoryError;

/// Repository for the append-only security audit trail.
pub struct SecurityEventRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SecurityEventRepository<'a> {
    /// Create a new security event repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Append one audit row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails. Callers in
    /// the audit path log this instead of propagating it.
    pub async fn record(
        &self,
        actor: Option<CustomerId>,
        action: &str,
        resource: &str,
        success: bool,
        details: &serde_json::Value,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO security_event (actor, action, resource, success, details)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(actor)
        .bind(action)
        .bind(resource)
        .bind(success)
        .bind(details)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
