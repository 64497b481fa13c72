//! Address model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use roadcall_core::AddressId;

/// A physical location row.
///
/// Addresses are append-only from this core's point of view and are not
/// deduplicated; each submission may create a new row even when the street
/// text matches an existing one.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Address {
    pub id: AddressId,
    pub street: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
}
