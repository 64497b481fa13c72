//! Session login/logout handlers.
//!
//! Credentials are verified by the identity provider; the resolved actor is
//! cached in the session so the gate can check roles without a round trip
//! on every request.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use roadcall_core::{CustomerId, Email};

use crate::db::CustomerRepository;
use crate::error::{AppError, Result};
use crate::middleware::{clear_current_actor, set_current_actor};
use crate::models::CurrentActor;
use crate::routes::customers::CustomerView;
use crate::state::AppState;

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub credential: String,
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub customer: CustomerView,
}

/// `POST /session` - verify credentials and establish a session.
///
/// Every rejection path answers with the same generic 401 so the endpoint
/// does not reveal which part of the pair was wrong.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let invalid = || AppError::Unauthorized("invalid credentials".to_string());

    let email = Email::parse(&body.email).map_err(|_| invalid())?;

    let record = state
        .identity()
        .verify_credentials(&email, &body.credential)
        .await?
        .ok_or_else(invalid)?;

    let customer = CustomerRepository::new(state.pool())
        .get(CustomerId::new(record.id))
        .await?
        .ok_or_else(invalid)?;

    let actor = CurrentActor::from(&customer);
    set_current_actor(&session, &actor)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!(customer_id = %customer.id, "session established");

    Ok(Json(LoginResponse {
        customer: CustomerView::from(&customer),
    }))
}

/// `DELETE /session` - clear the session.
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_actor(&session)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(StatusCode::NO_CONTENT)
}
