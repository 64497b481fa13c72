//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding. All route handlers return `Result<T, AppError>`.
//! Collaborator failures keep their detail in the server-side log only; the
//! caller-facing body stays generic.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::identity::IdentityError;
use crate::services::activation::ActivationError;
use crate::services::duplicates::SearchError;
use crate::services::order_intake::IntakeError;
use crate::services::provisioning::ProvisioningError;

/// Application-level error type for the server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Relational store operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Identity provider operation failed.
    #[error("Identity provider error: {0}")]
    Identity(#[from] IdentityError),

    /// A field failed validation; rejected before any write.
    #[error("Validation failed for {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// The email is already registered.
    #[error("Duplicate email")]
    DuplicateEmail,

    /// No identity resolved for a gated operation.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The caller's role or capability does not satisfy the requirement.
    /// Carries the caller's resolved permission level for the response body.
    #[error("Forbidden: {reason}")]
    Forbidden {
        reason: String,
        permission_level: String,
    },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Activation rate limit breached.
    #[error("Rate limited")]
    RateLimited { retry_after_minutes: u32 },

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ProvisioningError> for AppError {
    fn from(error: ProvisioningError) -> Self {
        match error {
            ProvisioningError::DuplicateEmail => Self::DuplicateEmail,
            ProvisioningError::Repository(e) => Self::Database(e),
            ProvisioningError::Identity(e) => Self::Identity(e),
            ProvisioningError::Credential(message) => Self::Internal(message),
        }
    }
}

impl From<IntakeError> for AppError {
    fn from(error: IntakeError) -> Self {
        match error {
            IntakeError::Validation { field, message } => Self::Validation { field, message },
            IntakeError::OnBehalfNotPermitted => Self::Forbidden {
                reason: error.to_string(),
                permission_level: String::new(),
            },
            IntakeError::UnknownCustomer => Self::Validation {
                field: "customer_id",
                message: "customer could not be resolved".to_string(),
            },
            IntakeError::Repository(e) => Self::Database(e),
        }
    }
}

impl From<SearchError> for AppError {
    fn from(error: SearchError) -> Self {
        match error {
            SearchError::Repository(e) => Self::Database(e),
            SearchError::Identity(e) => Self::Identity(e),
        }
    }
}

impl From<ActivationError> for AppError {
    fn from(error: ActivationError) -> Self {
        match error {
            ActivationError::Repository(e) => Self::Database(e),
            ActivationError::Identity(e) => Self::Identity(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(
            self,
            Self::Database(_) | Self::Identity(_) | Self::Internal(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(_) | Self::Identity(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::DuplicateEmail => StatusCode::CONFLICT,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        };

        // Don't expose internal error details to clients
        let body = match &self {
            Self::Database(_) | Self::Identity(_) | Self::Internal(_) => {
                json!({ "error": "Internal server error" })
            }
            Self::Validation { field, message } => {
                json!({ "error": message, "field": field })
            }
            Self::DuplicateEmail => {
                json!({ "error": "An account with this email already exists" })
            }
            Self::RateLimited {
                retry_after_minutes,
            } => json!({
                "error": "Too many activation requests",
                "retry_after_minutes": retry_after_minutes,
            }),
            Self::Forbidden {
                reason,
                permission_level,
            } => json!({ "error": reason, "permission_level": permission_level }),
            Self::Unauthorized(message) | Self::NotFound(message) => {
                json!({ "error": message })
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
