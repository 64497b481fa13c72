//! Order intake route handler.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use roadcall_core::{CustomerId, JobId, JobStatus, OrderId, ServiceId};

use crate::error::Result;
use crate::middleware::RequireActor;
use crate::services::audit::{SecurityEvent, record_security_event};
use crate::services::order_intake::{IntakeError, OrderIntakeService, OrderSubmission};
use crate::state::AppState;

/// Order submission request.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// Explicit order owner; requires the on-behalf-of capability.
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    #[serde(default)]
    pub vin: Option<String>,
    pub vehicle_year: String,
    pub vehicle_make: String,
    pub vehicle_model: String,
    pub street_address: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub earliest_available_at: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
    pub service_ids: Vec<ServiceId>,
}

/// One created job in the response.
#[derive(Debug, Serialize)]
pub struct JobView {
    pub id: JobId,
    pub service_id: ServiceId,
    pub priority: i16,
    pub status: JobStatus,
}

/// Order submission response.
#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub order_id: OrderId,
    pub jobs: Vec<JobView>,
}

/// `POST /orders` - decompose a submission into an order and its jobs.
pub async fn create(
    State(state): State<AppState>,
    RequireActor(actor): RequireActor,
    Json(body): Json<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>> {
    let target = body.customer_id;
    let submission = OrderSubmission {
        target_customer_id: body.customer_id,
        vin: body.vin,
        vehicle_year: body.vehicle_year,
        vehicle_make: body.vehicle_make,
        vehicle_model: body.vehicle_model,
        street_address: body.street_address,
        latitude: body.latitude,
        longitude: body.longitude,
        earliest_available_at: body.earliest_available_at,
        notes: body.notes,
        service_ids: body.service_ids,
    };

    let submitted = match OrderIntakeService::new(state.pool())
        .submit(&actor, submission, Utc::now())
        .await
    {
        Ok(submitted) => submitted,
        Err(error) => {
            if matches!(error, IntakeError::OnBehalfNotPermitted) {
                record_security_event(
                    state.pool(),
                    SecurityEvent {
                        actor: Some(actor.customer_id),
                        action: "order.create",
                        resource: target
                            .map_or_else(|| "order".to_string(), |id| format!("customer:{id}")),
                        success: false,
                        details: json!({
                            "reason": "on-behalf-of capability missing",
                            "role": actor.role().to_string(),
                        }),
                    },
                )
                .await;
                return Err(crate::error::AppError::Forbidden {
                    reason: error.to_string(),
                    permission_level: actor.role().to_string(),
                });
            }
            return Err(error.into());
        }
    };

    Ok(Json(CreateOrderResponse {
        order_id: submitted.order.id,
        jobs: submitted
            .jobs
            .iter()
            .map(|job| JobView {
                id: job.id,
                service_id: job.service_id,
                priority: job.priority,
                status: job.status,
            })
            .collect(),
    }))
}
