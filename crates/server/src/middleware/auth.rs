//! Authentication extractors.
//!
//! The login route stores the resolved [`CurrentActor`] in the session;
//! these extractors pull it back out once per request. Role derivation
//! happens on the actor itself so no handler re-combines the staff flags.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::CurrentActor;

/// Session keys used by the auth layer.
pub mod session_keys {
    /// The resolved caller for this session.
    pub const CURRENT_ACTOR: &str = "current_actor";
}

/// Extractor that requires an authenticated caller.
///
/// Rejects with a 401 when no identity is resolved; operations layer their
/// own role requirements on top of this.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireActor(actor): RequireActor,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", actor.name)
/// }
/// ```
pub struct RequireActor(pub CurrentActor);

impl<S> FromRequestParts<S> for RequireActor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(|| AppError::Unauthorized("authentication required".to_string()))?;

        let actor: CurrentActor = session
            .get(session_keys::CURRENT_ACTOR)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| AppError::Unauthorized("authentication required".to_string()))?;

        Ok(Self(actor))
    }
}

/// Extractor that optionally gets the current actor.
///
/// Unlike `RequireActor`, this does not reject the request when nobody is
/// logged in.
pub struct OptionalActor(pub Option<CurrentActor>);

impl<S> FromRequestParts<S> for OptionalActor
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentActor>(session_keys::CURRENT_ACTOR)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(actor))
    }
}

/// Helper to set the current actor in the session (login).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_actor(
    session: &Session,
    actor: &CurrentActor,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_ACTOR, actor).await
}

/// Helper to clear the current actor from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_actor(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentActor>(session_keys::CURRENT_ACTOR)
        .await?;
    Ok(())
}
