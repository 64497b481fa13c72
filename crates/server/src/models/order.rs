//! Order model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use roadcall_core::{AddressId, CustomerId, OrderId, VehicleId};

/// A service order row.
///
/// References exactly one customer, vehicle, and service address. When staff
/// submit on a customer's behalf, `created_by_staff` is set and
/// `staff_customer_id` records which staff identity acted.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub vehicle_id: VehicleId,
    pub address_id: AddressId,
    pub earliest_available_at: DateTime<Utc>,
    pub notes: String,
    pub created_by_staff: bool,
    pub staff_customer_id: Option<CustomerId>,
    pub created_at: DateTime<Utc>,
}
