//! Service catalog model.

use serde::Serialize;
use sqlx::FromRow;

use roadcall_core::{ServiceCategory, ServiceId};

/// A service offered by the business.
///
/// The category drives job priority; the duration is copied onto each job at
/// creation time.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Service {
    pub id: ServiceId,
    pub name: String,
    pub category: ServiceCategory,
    pub duration_minutes: i32,
    pub active: bool,
}
