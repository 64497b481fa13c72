//! Job model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use roadcall_core::{AddressId, JobId, JobStatus, OrderId, ServiceId};

/// An independently schedulable unit of work, one per selected service.
///
/// Created as `queued` with the order's earliest-available time and the
/// service's fixed duration; later mutated only by the external schedule
/// optimizer and technician status updates.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Job {
    pub id: JobId,
    pub order_id: OrderId,
    pub address_id: AddressId,
    pub service_id: ServiceId,
    pub priority: i16,
    pub status: JobStatus,
    pub requested_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}
