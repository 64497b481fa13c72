//! Service catalog repository.

use sqlx::PgPool;

use roadcall_core::ServiceId;

use super::RepositoryError;
use crate::models::Service;

const SERVICE_COLUMNS: &str = "id, name, category, duration_minutes, active";

/// Repository for the service catalog.
pub struct ServiceRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ServiceRepository<'a> {
    /// Create a new service repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the active services with the given ids, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_active(&self, ids: &[ServiceId]) -> Result<Vec<Service>, RepositoryError> {
        let raw_ids: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();

        let services = sqlx::query_as::<_, Service>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM service WHERE id = ANY($1) AND active"
        ))
        .bind(raw_ids)
        .fetch_all(self.pool)
        .await?;

        Ok(services)
    }

    /// List the full catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Service>, RepositoryError> {
        let services = sqlx::query_as::<_, Service>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM service ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(services)
    }

}
