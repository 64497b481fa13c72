//! Activation messaging, gated by a rolling rate limit.
//!
//! The limiter is deliberately enumeration-safe: existence is checked
//! before the rate limit, and the "no such email" and "issued" outcomes are
//! rendered identically by the route layer.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use tracing::instrument;

use roadcall_core::{CustomerId, Email};

use crate::db::{ActivationEmailRepository, RepositoryError};
use crate::identity::{AccountState, IdentityClient, IdentityError};

/// Maximum activation messages per customer per window.
pub const MAX_PER_WINDOW: i64 = 3;

/// Length of the trailing window in minutes.
pub const WINDOW_MINUTES: i64 = 60;

/// Fixed retry hint returned on a limit breach.
pub const RETRY_AFTER_MINUTES: u32 = 60;

/// Outcome of an activation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// A message was issued and logged.
    Issued,
    /// No identity has this email. Rendered identically to `Issued`.
    UnknownEmail,
    /// The account is already active; no message is sent.
    AlreadyActive,
    /// The rolling window is exhausted.
    RateLimited,
}

/// Errors from the activation flow.
#[derive(Debug, thiserror::Error)]
pub enum ActivationError {
    /// Relational store failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Identity provider failure.
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

/// True when another activation message may be issued given the count of
/// messages already inside the window.
#[must_use]
pub const fn within_limit(recent: i64) -> bool {
    recent < MAX_PER_WINDOW
}

/// Activation messaging service.
pub struct ActivationService<'a> {
    pool: &'a PgPool,
    identity: &'a IdentityClient,
    redirect_target: &'a str,
}

impl<'a> ActivationService<'a> {
    /// Create a new activation service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, identity: &'a IdentityClient, redirect_target: &'a str) -> Self {
        Self {
            pool,
            identity,
            redirect_target,
        }
    }

    /// Request an activation message for an email.
    ///
    /// Existence is resolved first; nonexistent and already-active accounts
    /// return without touching the limiter. A message is issued only when
    /// strictly fewer than [`MAX_PER_WINDOW`] messages were logged for this
    /// customer in the trailing window.
    ///
    /// # Errors
    ///
    /// Returns [`ActivationError`] when a collaborator fails.
    #[instrument(skip(self, requester_ip, user_agent), fields(email = %email))]
    pub async fn request_activation(
        &self,
        email: &Email,
        requester_ip: &str,
        user_agent: &str,
        now: DateTime<Utc>,
    ) -> Result<ActivationOutcome, ActivationError> {
        let Some(record) = self.identity.get_identity_by_email(email).await? else {
            return Ok(ActivationOutcome::UnknownEmail);
        };

        if record.state == AccountState::Enabled {
            return Ok(ActivationOutcome::AlreadyActive);
        }

        let customer_id = CustomerId::new(record.id);
        let log = ActivationEmailRepository::new(self.pool);
        let window_start = now - Duration::minutes(WINDOW_MINUTES);
        let recent = log.count_since(customer_id, window_start).await?;

        if !within_limit(recent) {
            tracing::warn!(customer_id = %customer_id, recent, "activation rate limit reached");
            return Ok(ActivationOutcome::RateLimited);
        }

        self.identity
            .issue_recovery_link(email, self.redirect_target)
            .await?;
        log.record(customer_id, requester_ip, user_agent, now).await?;

        Ok(ActivationOutcome::Issued)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_boundary() {
        // 2 messages in the window: a 3rd is allowed.
        assert!(within_limit(2));
        // 3 messages in the window: a 4th is denied.
        assert!(!within_limit(3));
        assert!(!within_limit(4));
        assert!(within_limit(0));
    }

    #[test]
    fn test_retry_hint_matches_window() {
        assert_eq!(i64::from(RETRY_AFTER_MINUTES), WINDOW_MINUTES);
    }
}
