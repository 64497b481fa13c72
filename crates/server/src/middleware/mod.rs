//! HTTP middleware: sessions, auth extractors, transport rate limiting.

pub mod auth;
pub mod rate_limit;
pub mod session;

pub use auth::{OptionalActor, RequireActor, clear_current_actor, set_current_actor};
pub use session::create_session_layer;
