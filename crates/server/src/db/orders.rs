//! Order repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use roadcall_core::{AddressId, CustomerId, OrderId, ServiceId, VehicleId};

use super::RepositoryError;
use crate::models::Order;

const ORDER_COLUMNS: &str = "id, customer_id, vehicle_id, address_id, earliest_available_at, \
     notes, created_by_staff, staff_customer_id, created_at";

/// Repository for order rows and the order-service join.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        customer_id: CustomerId,
        vehicle_id: VehicleId,
        address_id: AddressId,
        earliest_available_at: DateTime<Utc>,
        notes: &str,
        staff_customer_id: Option<CustomerId>,
    ) -> Result<Order, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            r"
            INSERT INTO customer_order
                (customer_id, vehicle_id, address_id, earliest_available_at, notes,
                 created_by_staff, staff_customer_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(customer_id)
        .bind(vehicle_id)
        .bind(address_id)
        .bind(earliest_available_at)
        .bind(notes)
        .bind(staff_customer_id.is_some())
        .bind(staff_customer_id)
        .fetch_one(self.pool)
        .await?;

        Ok(order)
    }

    /// Link a selected service to an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn add_service(
        &self,
        order_id: OrderId,
        service_id: ServiceId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO order_service (order_id, service_id) VALUES ($1, $2)")
            .bind(order_id)
            .bind(service_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM customer_order WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// Remove every order-service link for an order. Used only by saga
    /// compensation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_services(&self, order_id: OrderId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM order_service WHERE order_id = $1")
            .bind(order_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Delete an order row. Used only by saga compensation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: OrderId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM customer_order WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
