//! Security event recording.
//!
//! Permission denials, rate-limit breaches, and staff on-behalf-of attempts
//! are recorded for audit. Recording failures are logged and swallowed;
//! the audit path never blocks the primary response.

use sqlx::PgPool;

use roadcall_core::CustomerId;

use crate::db::SecurityEventRepository;

/// One security-relevant occurrence.
#[derive(Debug)]
pub struct SecurityEvent<'a> {
    /// The acting identity, if resolved.
    pub actor: Option<CustomerId>,
    /// What was attempted, e.g. `customer.create`.
    pub action: &'a str,
    /// What it was attempted against.
    pub resource: String,
    /// Whether the attempt succeeded.
    pub success: bool,
    /// Contextual details for the audit trail.
    pub details: serde_json::Value,
}

/// Record a security event, never failing the caller.
pub async fn record_security_event(pool: &PgPool, event: SecurityEvent<'_>) {
    let result = SecurityEventRepository::new(pool)
        .record(
            event.actor,
            event.action,
            &event.resource,
            event.success,
            &event.details,
        )
        .await;

    if let Err(error) = result {
        tracing::error!(
            action = event.action,
            resource = %event.resource,
            error = %error,
            "failed to record security event"
        );
    }
}
