//! Customer repository.
//!
//! Phone and name search queries do coarse candidate filtering in SQL; the
//! exact containment and ordering rules live in the duplicate-detection
//! service where they can be unit tested.

use sqlx::PgPool;
use uuid::Uuid;

use roadcall_core::{AddressId, Classification, CustomerId, Phone};

use super::RepositoryError;
use crate::models::Customer;

const CUSTOMER_COLUMNS: &str = "id, name, phone, classification, home_address_id, \
     is_administrator, is_technician, created_at, updated_at";

/// Repository for customer profile rows.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a customer profile keyed by the identity-provider UUID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the identity id already has a
    /// profile, `RepositoryError::Database` for other failures.
    pub async fn create(
        &self,
        id: CustomerId,
        name: &str,
        phone: &Phone,
        classification: Classification,
        home_address_id: AddressId,
    ) -> Result<Customer, RepositoryError> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            r"
            INSERT INTO customer (id, name, phone, classification, home_address_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {CUSTOMER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(name)
        .bind(phone)
        .bind(classification)
        .bind(home_address_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("customer profile already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(customer)
    }

    /// Get a customer by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customer WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(customer)
    }

    /// Get the customers whose identity ids appear in `ids`, in no
    /// particular order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_identity_ids(
        &self,
        ids: &[CustomerId],
    ) -> Result<Vec<Customer>, RepositoryError> {
        let uuids: Vec<Uuid> = ids.iter().map(|id| id.as_uuid()).collect();

        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customer WHERE id = ANY($1)"
        ))
        .bind(uuids)
        .fetch_all(self.pool)
        .await?;

        Ok(customers)
    }

    /// Phone containment search: stored number contained in the term or the
    /// term contained in the stored number, to support partial queries in
    /// both directions.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search_by_phone(
        &self,
        normalized_term: &str,
    ) -> Result<Vec<Customer>, RepositoryError> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            r"
            SELECT {CUSTOMER_COLUMNS}
            FROM customer
            WHERE phone <> '' AND ($1 LIKE '%' || phone || '%' OR phone LIKE '%' || $1 || '%')
            ORDER BY name
            "
        ))
        .bind(normalized_term)
        .fetch_all(self.pool)
        .await?;

        Ok(customers)
    }

    /// Candidates whose name matches all of the given ILIKE patterns.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search_by_name_all_patterns(
        &self,
        patterns: &[String],
    ) -> Result<Vec<Customer>, RepositoryError> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customer WHERE name ILIKE ALL($1)"
        ))
        .bind(patterns)
        .fetch_all(self.pool)
        .await?;

        Ok(customers)
    }

    /// Candidates whose name matches any of the given ILIKE patterns. Used
    /// to pre-filter fuzzy close-match scoring.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search_by_name_any_pattern(
        &self,
        patterns: &[String],
    ) -> Result<Vec<Customer>, RepositoryError> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customer WHERE name ILIKE ANY($1)"
        ))
        .bind(patterns)
        .fetch_all(self.pool)
        .await?;

        Ok(customers)
    }

}
