//! Integration tests for Roadcall.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations + seed
//! cargo run -p roadcall-cli -- migrate
//! cargo run -p roadcall-cli -- seed
//!
//! # Start the server (with an identity provider or stub configured)
//! cargo run -p roadcall-server
//!
//! # Run the ignored end-to-end tests
//! cargo test -p roadcall-integration-tests -- --ignored
//! ```
//!
//! # Environment
//!
//! - `ROADCALL_BASE_URL` - server under test (default `http://localhost:4000`)
//! - `ROADCALL_DATABASE_URL` - database, for row-level assertions
//! - `STAFF_EMAIL` / `STAFF_CREDENTIAL` - an admin-technician login
//! - `TECH_EMAIL` / `TECH_CREDENTIAL` - a technician-only login

use reqwest::Client;

/// Base URL for the server under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("ROADCALL_BASE_URL").unwrap_or_else(|_| "http://localhost:4000".to_string())
}

/// A client with a cookie store, so a login carries into later requests.
///
/// # Panics
///
/// Panics if the HTTP client cannot be constructed.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// Log in with the given environment-provided account and return the client.
///
/// # Panics
///
/// Panics if the variables are missing or the login fails.
pub async fn login(email_var: &str, credential_var: &str) -> Client {
    let client = client();
    let email = std::env::var(email_var)
        .unwrap_or_else(|_| panic!("{email_var} must be set for integration tests"));
    let credential = std::env::var(credential_var)
        .unwrap_or_else(|_| panic!("{credential_var} must be set for integration tests"));

    let resp = client
        .post(format!("{}/session", base_url()))
        .json(&serde_json::json!({ "email": email, "credential": credential }))
        .send()
        .await
        .expect("Failed to reach /session");
    assert!(resp.status().is_success(), "login failed for {email}");

    client
}

/// A unique throwaway email for a test run.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}+{}@roadcall-tests.dev", uuid::Uuid::new_v4())
}
