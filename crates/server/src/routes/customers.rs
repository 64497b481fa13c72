//! Customer route handlers: staff creation, self-service signup,
//! activation messaging, and search.

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use roadcall_core::{
    AddressId, Classification, CustomerId, Email, PermissionRequirement, Phone, TempCredential,
};

use crate::error::{AppError, Result};
use crate::middleware::RequireActor;
use crate::models::Customer;
use crate::services::activation::{ActivationOutcome, ActivationService, RETRY_AFTER_MINUTES};
use crate::services::audit::{SecurityEvent, record_security_event};
use crate::services::duplicates::DuplicateDetector;
use crate::services::provisioning::{NewCustomer, ProvisioningService};
use crate::state::AppState;

/// Generic activation response, identical for "issued" and "no such email"
/// so the endpoint cannot be used to enumerate accounts.
const GENERIC_ACTIVATION_MESSAGE: &str =
    "If an account exists for that address, an activation message has been sent.";

// =============================================================================
// Request / Response Types
// =============================================================================

/// Staff customer-creation request.
#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub classification: Classification,
    pub street_address: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Self-service signup request. Classification defaults to residential.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub classification: Option<Classification>,
    pub street_address: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Activation trigger request.
#[derive(Debug, Deserialize)]
pub struct ActivateRequest {
    pub email: String,
}

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Customer representation returned to callers.
#[derive(Debug, Serialize)]
pub struct CustomerView {
    pub id: CustomerId,
    pub name: String,
    pub phone: String,
    pub phone_display: String,
    pub classification: Classification,
    pub home_address_id: AddressId,
    pub is_administrator: bool,
    pub is_technician: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Customer> for CustomerView {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id,
            name: customer.name.clone(),
            phone: customer.phone.as_str().to_owned(),
            phone_display: customer.phone.display(),
            classification: customer.classification,
            home_address_id: customer.home_address_id,
            is_administrator: customer.is_administrator,
            is_technician: customer.is_technician,
            created_at: customer.created_at,
        }
    }
}

/// A fuzzy close match surfaced alongside staff creation.
#[derive(Debug, Serialize)]
pub struct CloseMatchView {
    pub customer: CustomerView,
    pub score: u8,
}

/// Response for both creation flows.
#[derive(Debug, Serialize)]
pub struct CreateCustomerResponse {
    pub customer: CustomerView,
    pub needs_activation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporary_credential: Option<TempCredential>,
    pub close_matches: Vec<CloseMatchView>,
}

/// Search response keyed by the detected mode.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub mode: &'static str,
    pub customers: Vec<CustomerView>,
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /customers` - staff creation, admin-technician gated.
pub async fn create(
    State(state): State<AppState>,
    RequireActor(actor): RequireActor,
    Json(body): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<CreateCustomerResponse>)> {
    let decision = PermissionRequirement::ADMIN_TECHNICIAN.check(actor.role());
    if let Some(reason) = decision.reason {
        record_security_event(
            state.pool(),
            SecurityEvent {
                actor: Some(actor.customer_id),
                action: "customer.create",
                resource: "customer".to_string(),
                success: false,
                details: json!({ "reason": reason, "role": actor.role().to_string() }),
            },
        )
        .await;
        return Err(AppError::Forbidden {
            reason: reason.to_string(),
            permission_level: actor.role().to_string(),
        });
    }

    let input = validate_new_customer(
        &body.name,
        &body.email,
        &body.phone,
        body.classification,
        &body.street_address,
        body.latitude,
        body.longitude,
    )?;

    let detector = DuplicateDetector::new(state.pool(), state.identity());
    if detector.email_exists(&input.email).await? {
        return Err(AppError::DuplicateEmail);
    }

    let close_matches: Vec<CloseMatchView> = detector
        .close_matches(&input.name)
        .await?
        .iter()
        .map(|scored| CloseMatchView {
            customer: CustomerView::from(&scored.customer),
            score: scored.score,
        })
        .collect();

    let provisioned = ProvisioningService::new(state.pool(), state.identity())
        .create_customer(input, true)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateCustomerResponse {
            customer: CustomerView::from(&provisioned.customer),
            needs_activation: provisioned.needs_activation,
            temporary_credential: provisioned.temporary_credential,
            close_matches,
        }),
    ))
}

/// `POST /signup` - self-service creation (legacy credential flow), ungated.
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<(StatusCode, Json<CreateCustomerResponse>)> {
    let input = validate_new_customer(
        &body.name,
        &body.email,
        &body.phone,
        body.classification.unwrap_or(Classification::Residential),
        &body.street_address,
        body.latitude,
        body.longitude,
    )?;

    let detector = DuplicateDetector::new(state.pool(), state.identity());
    if detector.email_exists(&input.email).await? {
        return Err(AppError::DuplicateEmail);
    }

    let provisioned = ProvisioningService::new(state.pool(), state.identity())
        .create_customer(input, false)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateCustomerResponse {
            customer: CustomerView::from(&provisioned.customer),
            needs_activation: provisioned.needs_activation,
            temporary_credential: provisioned.temporary_credential,
            close_matches: Vec::new(),
        }),
    ))
}

/// `POST /customers/activate` - rate-limited activation messaging.
///
/// Always answers 200 with the same generic body for "issued" and "no such
/// email"; only "already active" and the 429 limit breach are
/// distinguishable.
pub async fn activate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ActivateRequest>,
) -> Result<Json<serde_json::Value>> {
    let email = Email::parse(&body.email).map_err(|e| AppError::Validation {
        field: "email",
        message: e.to_string(),
    })?;

    let redirect_target = state.config().activation_redirect_url();
    let service = ActivationService::new(state.pool(), state.identity(), &redirect_target);

    let requester_ip = client_ip(&headers);
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let outcome = service
        .request_activation(&email, &requester_ip, &user_agent, Utc::now())
        .await?;

    match outcome {
        ActivationOutcome::Issued | ActivationOutcome::UnknownEmail => {
            Ok(Json(json!({ "message": GENERIC_ACTIVATION_MESSAGE })))
        }
        ActivationOutcome::AlreadyActive => Ok(Json(json!({
            "message": "This account is already active. Sign in instead."
        }))),
        ActivationOutcome::RateLimited => {
            record_security_event(
                state.pool(),
                SecurityEvent {
                    actor: None,
                    action: "customer.activate",
                    resource: format!("email:{email}"),
                    success: false,
                    details: json!({ "reason": "rate limit", "ip": requester_ip }),
                },
            )
            .await;
            Err(AppError::RateLimited {
                retry_after_minutes: RETRY_AFTER_MINUTES,
            })
        }
    }
}

/// `GET /customers/search?q=` - technician-gated customer search.
pub async fn search(
    State(state): State<AppState>,
    RequireActor(actor): RequireActor,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>> {
    let decision = PermissionRequirement::TECHNICIAN.check(actor.role());
    if let Some(reason) = decision.reason {
        record_security_event(
            state.pool(),
            SecurityEvent {
                actor: Some(actor.customer_id),
                action: "customer.search",
                resource: "customer".to_string(),
                success: false,
                details: json!({ "reason": reason, "role": actor.role().to_string() }),
            },
        )
        .await;
        return Err(AppError::Forbidden {
            reason: reason.to_string(),
            permission_level: actor.role().to_string(),
        });
    }

    let outcome = DuplicateDetector::new(state.pool(), state.identity())
        .search(&query.q)
        .await?;

    Ok(Json(SearchResponse {
        mode: outcome.mode,
        customers: outcome.customers.iter().map(CustomerView::from).collect(),
    }))
}

// =============================================================================
// Helpers
// =============================================================================

/// Field-level validation for both creation flows.
fn validate_new_customer(
    name: &str,
    email: &str,
    phone: &str,
    classification: Classification,
    street_address: &str,
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<NewCustomer> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation {
            field: "name",
            message: "name is required".to_string(),
        });
    }

    let email = Email::parse(email).map_err(|e| AppError::Validation {
        field: "email",
        message: e.to_string(),
    })?;

    let phone = Phone::parse(phone).map_err(|e| AppError::Validation {
        field: "phone",
        message: e.to_string(),
    })?;

    let street_address = street_address.trim();
    if street_address.is_empty() {
        return Err(AppError::Validation {
            field: "street_address",
            message: "street address is required".to_string(),
        });
    }

    Ok(NewCustomer {
        name: name.to_string(),
        email,
        phone,
        classification,
        street_address: street_address.to_string(),
        latitude,
        longitude,
    })
}

/// Best-effort client IP from standard proxy headers.
pub fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
        .unwrap_or("unknown")
        .to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_new_customer_field_errors() {
        let err = validate_new_customer(
            "",
            "jane@example.com",
            "5551234567",
            Classification::Residential,
            "12 Elm St",
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation { field: "name", .. }));

        let err = validate_new_customer(
            "Jane",
            "not-an-email",
            "5551234567",
            Classification::Residential,
            "12 Elm St",
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation { field: "email", .. }));

        let err = validate_new_customer(
            "Jane",
            "jane@example.com",
            "123",
            Classification::Residential,
            "12 Elm St",
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation { field: "phone", .. }));
    }

    #[test]
    fn test_client_ip_prefers_forwarded_chain() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.9, 10.0.0.1".parse().unwrap());
        headers.insert("x-real-ip", "198.51.100.4".parse().unwrap());
        assert_eq!(client_ip(&headers), "203.0.113.9");

        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "198.51.100.4".parse().unwrap());
        assert_eq!(client_ip(&headers), "198.51.100.4");

        assert_eq!(client_ip(&HeaderMap::new()), "unknown");
    }
}
