//! Customer profile model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use roadcall_core::{AddressId, Classification, CustomerId, Phone};

/// A customer profile row.
///
/// Keyed by the identity-provider UUID; the email itself lives only in the
/// identity provider. The two staff flags are independent booleans and
/// "admin-technician" is their conjunction, never a stored state.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub phone: Phone,
    pub classification: Classification,
    pub home_address_id: AddressId,
    pub is_administrator: bool,
    pub is_technician: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
