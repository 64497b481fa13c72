//! Vehicle model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use roadcall_core::VehicleId;

/// A vehicle row.
///
/// The VIN is globally unique when present; VIN-less rows may be duplicated
/// across submissions. Make and model are stored upper-cased and trimmed.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Vehicle {
    pub id: VehicleId,
    pub vin: Option<String>,
    pub year: i32,
    pub make: String,
    pub model: String,
    pub created_at: DateTime<Utc>,
}
