//! Address repository.

use sqlx::PgPool;

use roadcall_core::AddressId;

use super::RepositoryError;
use crate::models::Address;

/// Repository for address rows.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new address row.
    ///
    /// Addresses are intentionally not deduplicated; each caller that
    /// references a physical location gets its own row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        street: &str,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<Address, RepositoryError> {
        let address = sqlx::query_as::<_, Address>(
            r"
            INSERT INTO address (street, latitude, longitude)
            VALUES ($1, $2, $3)
            RETURNING id, street, latitude, longitude, created_at
            ",
        )
        .bind(street)
        .bind(latitude)
        .bind(longitude)
        .fetch_one(self.pool)
        .await?;

        Ok(address)
    }

    /// Get an address by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: AddressId) -> Result<Option<Address>, RepositoryError> {
        let address = sqlx::query_as::<_, Address>(
            r"
            SELECT id, street, latitude, longitude, created_at
            FROM address
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(address)
    }

    /// Delete an address row. Used only by saga compensation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: AddressId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM address WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
