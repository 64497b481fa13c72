//! Vehicle repository.

use sqlx::PgPool;

use roadcall_core::VehicleId;

use super::RepositoryError;
use crate::models::Vehicle;

const VEHICLE_COLUMNS: &str = "id, vin, year, make, model, created_at";

/// Outcome of a VIN upsert: the row plus whether this call inserted it.
///
/// Compensation must only delete rows this request created, never a vehicle
/// that already existed and was reused.
#[derive(Debug)]
pub struct UpsertedVehicle {
    pub vehicle: Vehicle,
    pub inserted: bool,
}

/// Repository for vehicle rows.
pub struct VehicleRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> VehicleRepository<'a> {
    /// Create a new vehicle repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a vehicle row unconditionally (no VIN supplied).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        &self,
        vin: Option<&str>,
        year: i32,
        make: &str,
        model: &str,
    ) -> Result<Vehicle, RepositoryError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(&format!(
            r"
            INSERT INTO vehicle (vin, year, make, model)
            VALUES ($1, $2, $3, $4)
            RETURNING {VEHICLE_COLUMNS}
            "
        ))
        .bind(vin)
        .bind(year)
        .bind(make)
        .bind(model)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("VIN already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(vehicle)
    }

    /// Update-or-insert keyed by VIN.
    ///
    /// An existing row with the VIN is reused (its descriptor fields are
    /// refreshed); otherwise a new row is inserted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either statement fails.
    pub async fn upsert_by_vin(
        &self,
        vin: &str,
        year: i32,
        make: &str,
        model: &str,
    ) -> Result<UpsertedVehicle, RepositoryError> {
        let existing = sqlx::query_as::<_, Vehicle>(&format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicle WHERE vin = $1"
        ))
        .bind(vin)
        .fetch_optional(self.pool)
        .await?;

        if let Some(vehicle) = existing {
            let updated = sqlx::query_as::<_, Vehicle>(&format!(
                r"
                UPDATE vehicle
                SET year = $2, make = $3, model = $4
                WHERE id = $1
                RETURNING {VEHICLE_COLUMNS}
                "
            ))
            .bind(vehicle.id)
            .bind(year)
            .bind(make)
            .bind(model)
            .fetch_one(self.pool)
            .await?;

            return Ok(UpsertedVehicle {
                vehicle: updated,
                inserted: false,
            });
        }

        let vehicle = self.insert(Some(vin), year, make, model).await?;
        Ok(UpsertedVehicle {
            vehicle,
            inserted: true,
        })
    }

    /// Get a vehicle by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: VehicleId) -> Result<Option<Vehicle>, RepositoryError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(&format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicle WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(vehicle)
    }

    /// Delete a vehicle row. Used only by saga compensation, and only for
    /// rows inserted by the failing request.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: VehicleId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM vehicle WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
