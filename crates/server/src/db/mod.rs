//! Database operations for the Roadcall `PostgreSQL` store.
//!
//! # Tables
//!
//! - `address` - Physical locations (home + service addresses, append-only)
//! - `customer` - Profiles keyed by the identity provider's UUID
//! - `vehicle` - Vehicles, unique by VIN when a VIN is present
//! - `customer_order` / `order_service` - Orders and their selected services
//! - `job` - Schedulable jobs, one per order-service
//! - `service` - The service catalog (seeded via the CLI)
//! - `activation_email` - Append-only log driving the activation rate limit
//! - `security_event` - Audit trail for security-sensitive outcomes
//! - `tower_sessions.session` - Session storage
//!
//! # Migrations
//!
//! Migrations live in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p roadcall-cli -- migrate
//! ```

pub mod activation_emails;
pub mod addresses;
pub mod customers;
pub mod jobs;
pub mod orders;
pub mod security_events;
pub mod services;
pub mod vehicles;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use activation_emails::ActivationEmailRepository;
pub use addresses::AddressRepository;
pub use customers::CustomerRepository;
pub use jobs::JobRepository;
pub use orders::OrderRepository;
pub use security_events::SecurityEventRepository;
pub use services::ServiceRepository;
pub use vehicles::VehicleRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique VIN).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
