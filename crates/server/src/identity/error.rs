//! Identity provider error types.

use thiserror::Error;

/// Errors from the identity provider API.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("identity provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The email is already registered.
    #[error("email already registered")]
    EmailTaken,

    /// The identity does not exist.
    #[error("identity not found")]
    NotFound,

    /// Any other non-success response.
    #[error("identity provider returned {status}: {message}")]
    Status {
        /// HTTP status code from the provider.
        status: u16,
        /// Provider error message, already safe to log (never shown to callers).
        message: String,
    },
}
