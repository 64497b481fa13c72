//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Readiness check (verifies database)
//!
//! # Customers
//! POST /customers               - Staff creation (admin-technician gated)
//! POST /customers/activate      - Activation messaging (rate limited)
//! GET  /customers/search?q=     - Customer search (technician gated)
//!
//! # Self-service
//! POST /signup                  - Legacy self-service signup
//!
//! # Orders
//! POST /orders                  - Order intake (authenticated)
//!
//! # Session
//! POST   /session               - Login
//! DELETE /session               - Logout
//! ```

pub mod customers;
pub mod orders;
pub mod session;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::rate_limit;
use crate::state::AppState;

/// Routes with a per-IP transport limit: everything a stranger can hammer.
fn limited_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(customers::signup))
        .route("/customers/activate", post(customers::activate))
        .route("/session", post(session::login).delete(session::logout))
        .layer(rate_limit::auth_rate_limiter())
}

/// Create all routes for the server.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/customers", post(customers::create))
        .route("/customers/search", get(customers::search))
        .route("/orders", post(orders::create))
        .merge(limited_routes())
}
