//! Order intake pipeline.
//!
//! Decomposes one submission into an address, a vehicle, an order, and one
//! job per selected service. The sequential steps register compensations
//! with the same saga runner provisioning uses; the per-service job inserts
//! fan out concurrently and the pipeline waits for all of them before
//! responding. The first fan-out failure is reported, but in-flight
//! siblings are never cancelled.

use chrono::{DateTime, Datelike, Utc};
use sqlx::PgPool;
use tracing::instrument;

use roadcall_core::{CustomerId, ServiceId, job_priority};

use crate::db::{
    AddressRepository, CustomerRepository, JobRepository, OrderRepository, RepositoryError,
    ServiceRepository, VehicleRepository,
};
use crate::models::{CurrentActor, Job, Order};
use crate::services::saga::Saga;

/// Earliest accepted model year.
const MIN_VEHICLE_YEAR: i32 = 1900;

/// One order submission, as validated by the route layer.
#[derive(Debug)]
pub struct OrderSubmission {
    /// Explicit target customer for staff on-behalf-of submissions.
    pub target_customer_id: Option<CustomerId>,
    pub vin: Option<String>,
    pub vehicle_year: String,
    pub vehicle_make: String,
    pub vehicle_model: String,
    pub street_address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub earliest_available_at: DateTime<Utc>,
    pub notes: String,
    pub service_ids: Vec<ServiceId>,
}

/// Result of a successful submission.
#[derive(Debug)]
pub struct SubmittedOrder {
    pub order: Order,
    pub jobs: Vec<Job>,
}

/// Errors from the intake pipeline.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    /// A field failed validation before any write.
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// An explicit target customer was supplied without the on-behalf-of
    /// capability.
    #[error("submitting on behalf of another customer requires the admin-technician role")]
    OnBehalfNotPermitted,

    /// The order-owning customer could not be resolved.
    #[error("customer not found")]
    UnknownCustomer,

    /// Relational store failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl IntakeError {
    fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

/// Validate a vehicle model year string.
///
/// Must be exactly four ASCII digits and fall in `1900..=current_year + 1`
/// (next-model-year vehicles are sold before the calendar catches up).
///
/// # Errors
///
/// Returns a caller-facing message describing the rejection.
pub fn validate_vehicle_year(raw: &str, current_year: i32) -> Result<i32, String> {
    let raw = raw.trim();
    if raw.len() != 4 || !raw.chars().all(|c| c.is_ascii_digit()) {
        return Err("vehicle year must be a 4-digit number".to_string());
    }

    let year: i32 = raw
        .parse()
        .map_err(|_| "vehicle year must be a 4-digit number".to_string())?;

    let max_year = current_year + 1;
    if !(MIN_VEHICLE_YEAR..=max_year).contains(&year) {
        return Err(format!(
            "vehicle year must be between {MIN_VEHICLE_YEAR} and {max_year}"
        ));
    }

    Ok(year)
}

/// Order intake service.
pub struct OrderIntakeService<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderIntakeService<'a> {
    /// Create a new order intake service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Run the intake pipeline for one submission.
    ///
    /// Resolution and validation happen before any write. The write steps
    /// register compensations, so a failure at any point deletes the rows
    /// created so far in reverse order before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError`] describing the first failure.
    #[instrument(skip(self, actor, submission), fields(actor = %actor.customer_id))]
    pub async fn submit(
        &self,
        actor: &CurrentActor,
        submission: OrderSubmission,
        now: DateTime<Utc>,
    ) -> Result<SubmittedOrder, IntakeError> {
        // Step 1: resolve the order-owning customer
        let owner_id = match submission.target_customer_id {
            Some(target) => {
                if !actor.role().can_act_on_behalf_of_customers() {
                    return Err(IntakeError::OnBehalfNotPermitted);
                }
                target
            }
            None => actor.customer_id,
        };
        let acting_for_other = owner_id != actor.customer_id;

        // Step 2: resolve the owner's classification
        let owner = CustomerRepository::new(self.pool)
            .get(owner_id)
            .await?
            .ok_or(IntakeError::UnknownCustomer)?;

        // Step 3: validate before any write
        let year = validate_vehicle_year(&submission.vehicle_year, now.year())
            .map_err(|message| IntakeError::validation("vehicle_year", message))?;

        let make = submission.vehicle_make.trim().to_uppercase();
        let model = submission.vehicle_model.trim().to_uppercase();
        if make.is_empty() {
            return Err(IntakeError::validation("vehicle_make", "vehicle make is required"));
        }
        if model.is_empty() {
            return Err(IntakeError::validation("vehicle_model", "vehicle model is required"));
        }

        let street = submission.street_address.trim();
        if street.is_empty() {
            return Err(IntakeError::validation(
                "street_address",
                "service address is required",
            ));
        }

        let vin = submission
            .vin
            .as_deref()
            .map(|v| v.trim().to_uppercase())
            .filter(|v| !v.is_empty());

        let mut seen = std::collections::HashSet::new();
        let mut service_ids = submission.service_ids.clone();
        service_ids.retain(|id| seen.insert(*id));
        if service_ids.is_empty() {
            return Err(IntakeError::validation(
                "service_ids",
                "at least one service must be selected",
            ));
        }
        let services = ServiceRepository::new(self.pool)
            .get_active(&service_ids)
            .await?;
        if services.len() != service_ids.len() {
            return Err(IntakeError::validation(
                "service_ids",
                "one or more selected services are unknown or inactive",
            ));
        }

        let mut saga = Saga::new();

        // Step 4: service address
        let address = AddressRepository::new(self.pool)
            .create(street, submission.latitude, submission.longitude)
            .await?;
        {
            let pool = self.pool.clone();
            let address_id = address.id;
            saga.push("delete order address", async move {
                AddressRepository::new(&pool)
                    .delete(address_id)
                    .await
                    .map_err(Into::into)
            });
        }

        // Step 5: vehicle (upsert by VIN, plain insert otherwise)
        let vehicles = VehicleRepository::new(self.pool);
        let (vehicle, vehicle_inserted) = match vin.as_deref() {
            Some(vin) => {
                let upserted = match vehicles.upsert_by_vin(vin, year, &make, &model).await {
                    Ok(upserted) => upserted,
                    Err(error) => {
                        saga.unwind().await;
                        return Err(error.into());
                    }
                };
                (upserted.vehicle, upserted.inserted)
            }
            None => match vehicles.insert(None, year, &make, &model).await {
                Ok(vehicle) => (vehicle, true),
                Err(error) => {
                    saga.unwind().await;
                    return Err(error.into());
                }
            },
        };
        if vehicle_inserted {
            let pool = self.pool.clone();
            let vehicle_id = vehicle.id;
            saga.push("delete order vehicle", async move {
                VehicleRepository::new(&pool)
                    .delete(vehicle_id)
                    .await
                    .map_err(Into::into)
            });
        }

        // Step 6: the order itself
        let order = match OrderRepository::new(self.pool)
            .create(
                owner_id,
                vehicle.id,
                address.id,
                submission.earliest_available_at,
                submission.notes.trim(),
                acting_for_other.then_some(actor.customer_id),
            )
            .await
        {
            Ok(order) => order,
            Err(error) => {
                saga.unwind().await;
                return Err(error.into());
            }
        };
        {
            let pool = self.pool.clone();
            let order_id = order.id;
            saga.push("delete order", async move {
                OrderRepository::new(&pool)
                    .delete(order_id)
                    .await
                    .map_err(Into::into)
            });
        }

        // Step 7: fan out one job per selected service. All inserts run
        // concurrently and all are awaited; the first failure wins but does
        // not cancel its siblings.
        let order_id = order.id;
        let address_id = address.id;
        let requested_at = submission.earliest_available_at;
        let notes = submission.notes.trim();
        let results = futures::future::join_all(services.iter().map(|service| {
            let orders = OrderRepository::new(self.pool);
            let jobs = JobRepository::new(self.pool);
            let priority = job_priority(owner.classification, service.category);
            async move {
                orders.add_service(order_id, service.id).await?;
                jobs.create(
                    order_id,
                    address_id,
                    service.id,
                    priority,
                    requested_at,
                    service.duration_minutes,
                    notes,
                )
                .await
            }
        }))
        .await;

        let mut jobs = Vec::with_capacity(results.len());
        let mut first_error = None;
        for result in results {
            match result {
                Ok(job) => jobs.push(job),
                Err(error) => {
                    if first_error.is_none() {
                        first_error = Some(error);
                    }
                }
            }
        }

        if let Some(error) = first_error {
            // Remove whatever the fan-out managed to create, then let the
            // saga take back the order, vehicle, and address.
            let job_repo = JobRepository::new(self.pool);
            if let Err(cleanup) = job_repo.delete_by_order(order.id).await {
                tracing::error!(order_id = %order.id, error = %cleanup, "job cleanup failed; manual reconciliation required");
            }
            let order_repo = OrderRepository::new(self.pool);
            if let Err(cleanup) = order_repo.delete_services(order.id).await {
                tracing::error!(order_id = %order.id, error = %cleanup, "order-service cleanup failed; manual reconciliation required");
            }
            saga.unwind().await;
            return Err(error.into());
        }

        saga.commit();

        tracing::info!(
            order_id = %order.id,
            customer_id = %owner_id,
            jobs = jobs.len(),
            acting_for_other,
            "order submitted"
        );

        Ok(SubmittedOrder { order, jobs })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_year_upper_bound_is_next_year() {
        // Against a current year of 2025: 2031 rejects, 2026 accepts.
        assert!(validate_vehicle_year("2031", 2025).is_err());
        assert_eq!(validate_vehicle_year("2026", 2025).unwrap(), 2026);
        assert_eq!(validate_vehicle_year("2025", 2025).unwrap(), 2025);
    }

    #[test]
    fn test_year_lower_bound() {
        assert!(validate_vehicle_year("1899", 2025).is_err());
        assert_eq!(validate_vehicle_year("1900", 2025).unwrap(), 1900);
    }

    #[test]
    fn test_year_must_be_four_digits() {
        assert!(validate_vehicle_year("31", 2025).is_err());
        assert!(validate_vehicle_year("20251", 2025).is_err());
        assert!(validate_vehicle_year("2O25", 2025).is_err());
        assert!(validate_vehicle_year("", 2025).is_err());
    }

    #[test]
    fn test_year_trims_whitespace() {
        assert_eq!(validate_vehicle_year(" 2024 ", 2025).unwrap(), 2024);
    }
}
