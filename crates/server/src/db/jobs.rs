//! Job repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use roadcall_core::{AddressId, JobStatus, OrderId, ServiceId};

use super::RepositoryError;
use crate::models::Job;

const JOB_COLUMNS: &str = "id, order_id, address_id, service_id, priority, status, \
     requested_at, duration_minutes, notes, created_at";

/// Repository for job rows.
pub struct JobRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> JobRepository<'a> {
    /// Create a new job repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a job row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        order_id: OrderId,
        address_id: AddressId,
        service_id: ServiceId,
        priority: i16,
        requested_at: DateTime<Utc>,
        duration_minutes: i32,
        notes: &str,
    ) -> Result<Job, RepositoryError> {
        let job = sqlx::query_as::<_, Job>(&format!(
            r"
            INSERT INTO job
                (order_id, address_id, service_id, priority, status, requested_at,
                 duration_minutes, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {JOB_COLUMNS}
            "
        ))
        .bind(order_id)
        .bind(address_id)
        .bind(service_id)
        .bind(priority)
        .bind(JobStatus::Queued)
        .bind(requested_at)
        .bind(duration_minutes)
        .bind(notes)
        .fetch_one(self.pool)
        .await?;

        Ok(job)
    }

    /// Delete every job belonging to an order. Used only by saga
    /// compensation after a partial fan-out failure.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_by_order(&self, order_id: OrderId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM job WHERE order_id = $1")
            .bind(order_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
