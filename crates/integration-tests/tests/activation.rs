//! End-to-end tests for activation messaging and its rate limit.

use reqwest::StatusCode;
use roadcall_integration_tests::{base_url, client, login, unique_email};
use serde_json::{Value, json};

async fn request_activation(email: &str) -> reqwest::Response {
    client()
        .post(format!("{}/customers/activate", base_url()))
        .json(&json!({ "email": email }))
        .send()
        .await
        .expect("Failed to request activation")
}

#[tokio::test]
#[ignore = "Requires running server, database, and identity provider"]
async fn test_unknown_email_gets_generic_success() {
    let resp = request_activation(&unique_email("ghost")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    let generic = body["message"].as_str().expect("message missing").to_owned();

    // An existing-but-inactive account must produce the identical body.
    let staff = login("STAFF_EMAIL", "STAFF_CREDENTIAL").await;
    let email = unique_email("invited");
    let created = staff
        .post(format!("{}/customers", base_url()))
        .json(&json!({
            "name": "Invited Customer",
            "email": email,
            "phone": "5553330001",
            "classification": "residential",
            "street_address": "1 Invite Way",
        }))
        .send()
        .await
        .expect("Failed to create customer");
    assert_eq!(created.status(), StatusCode::CREATED);

    let resp = request_activation(&email).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["message"].as_str(), Some(generic.as_str()));
}

#[tokio::test]
#[ignore = "Requires running server, database, and identity provider"]
async fn test_fourth_request_in_window_is_rate_limited() {
    let staff = login("STAFF_EMAIL", "STAFF_CREDENTIAL").await;
    let email = unique_email("ratelimit");
    let created = staff
        .post(format!("{}/customers", base_url()))
        .json(&json!({
            "name": "Rate Limited",
            "email": email,
            "phone": "5553330002",
            "classification": "residential",
            "street_address": "3 Limit Court",
        }))
        .send()
        .await
        .expect("Failed to create customer");
    assert_eq!(created.status(), StatusCode::CREATED);

    // Three messages fit in the window...
    for _ in 0..3 {
        let resp = request_activation(&email).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    // ...the fourth does not, and carries the fixed retry hint.
    let resp = request_activation(&email).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["retry_after_minutes"], json!(60));
}
