//! End-to-end tests for order intake.
//!
//! Requires the service catalog to be seeded
//! (`cargo run -p roadcall-cli -- seed`).

use reqwest::StatusCode;
use roadcall_integration_tests::{base_url, client, login, unique_email};
use serde_json::{Value, json};

/// Find a seeded service id by category.
async fn service_id(pool: &sqlx::PgPool, category: &str) -> i32 {
    sqlx::query_scalar("SELECT id FROM service WHERE category = $1::service_category LIMIT 1")
        .bind(category)
        .fetch_one(pool)
        .await
        .expect("seeded service missing")
}

async fn pool() -> sqlx::PgPool {
    let database_url =
        std::env::var("ROADCALL_DATABASE_URL").expect("ROADCALL_DATABASE_URL must be set");
    sqlx::PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to database")
}

fn order_body(service_ids: &[i32], year: &str) -> Value {
    json!({
        "vin": "1HGCM82633A004352",
        "vehicle_year": year,
        "vehicle_make": "honda",
        "vehicle_model": "accord",
        "street_address": "400 Intake Blvd",
        "earliest_available_at": "2026-09-01T14:00:00Z",
        "notes": "gate code 4411",
        "service_ids": service_ids,
    })
}

/// Create a commercial customer and return its id.
async fn create_commercial_customer(staff: &reqwest::Client) -> String {
    let resp = staff
        .post(format!("{}/customers", base_url()))
        .json(&json!({
            "name": "Fleet Repair Co",
            "email": unique_email("fleet"),
            "phone": "5552224444",
            "classification": "commercial",
            "street_address": "77 Depot Road",
        }))
        .send()
        .await
        .expect("Failed to create customer");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Failed to parse response");
    body["customer"]["id"]
        .as_str()
        .expect("customer id missing")
        .to_owned()
}

#[tokio::test]
#[ignore = "Requires running server, seeded database, and identity provider"]
async fn test_unauthenticated_submission_is_rejected() {
    let resp = client()
        .post(format!("{}/orders", base_url()))
        .json(&order_body(&[1], "2024"))
        .send()
        .await
        .expect("Failed to send order");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running server, seeded database, and identity provider"]
async fn test_future_year_is_rejected_before_any_write() {
    let staff = login("STAFF_EMAIL", "STAFF_CREDENTIAL").await;
    let pool = pool().await;
    let adas = service_id(&pool, "adas").await;

    let resp = staff
        .post(format!("{}/orders", base_url()))
        .json(&order_body(&[adas], "2031"))
        .send()
        .await
        .expect("Failed to send order");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["field"], json!("vehicle_year"));
}

#[tokio::test]
#[ignore = "Requires running server, seeded database, and identity provider"]
async fn test_on_behalf_requires_admin_technician() {
    let staff = login("STAFF_EMAIL", "STAFF_CREDENTIAL").await;
    let target = create_commercial_customer(&staff).await;
    let pool = pool().await;
    let adas = service_id(&pool, "adas").await;

    // Technician-only caller: denied.
    let tech = login("TECH_EMAIL", "TECH_CREDENTIAL").await;
    let mut body = order_body(&[adas], "2024");
    body["customer_id"] = json!(target);
    let resp = tech
        .post(format!("{}/orders", base_url()))
        .json(&body)
        .send()
        .await
        .expect("Failed to send order");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Admin-technician caller: allowed.
    let resp = staff
        .post(format!("{}/orders", base_url()))
        .json(&body)
        .send()
        .await
        .expect("Failed to send order");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running server, seeded database, and identity provider"]
async fn test_commercial_adas_and_prog_fan_out_priorities() {
    let staff = login("STAFF_EMAIL", "STAFF_CREDENTIAL").await;
    let target = create_commercial_customer(&staff).await;
    let pool = pool().await;
    let adas = service_id(&pool, "adas").await;
    let prog = service_id(&pool, "prog").await;

    let mut body = order_body(&[adas, prog], "2024");
    body["customer_id"] = json!(target);

    let resp = staff
        .post(format!("{}/orders", base_url()))
        .json(&body)
        .send()
        .await
        .expect("Failed to send order");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse response");
    let jobs = body["jobs"].as_array().expect("jobs array");
    assert_eq!(jobs.len(), 2);

    let priority_of = |service: i32| {
        jobs.iter()
            .find(|job| job["service_id"] == json!(service))
            .map(|job| job["priority"].clone())
            .expect("job for service missing")
    };
    assert_eq!(priority_of(adas), json!(2));
    assert_eq!(priority_of(prog), json!(5));

    for job in jobs {
        assert_eq!(job["status"], json!("queued"));
    }
}

#[tokio::test]
#[ignore = "Requires running server, seeded database, and identity provider"]
async fn test_vin_upsert_reuses_vehicle_row() {
    let staff = login("STAFF_EMAIL", "STAFF_CREDENTIAL").await;
    let target = create_commercial_customer(&staff).await;
    let pool = pool().await;
    let diag = service_id(&pool, "diag").await;

    let vin = format!("TEST{}", &uuid::Uuid::new_v4().simple().to_string()[..13]);
    let mut body = order_body(&[diag], "2024");
    body["customer_id"] = json!(target);
    body["vin"] = json!(vin);

    for _ in 0..2 {
        let resp = staff
            .post(format!("{}/orders", base_url()))
            .json(&body)
            .send()
            .await
            .expect("Failed to send order");
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vehicle WHERE vin = $1")
        .bind(vin.to_uppercase())
        .fetch_one(&pool)
        .await
        .expect("Failed to count vehicles");
    assert_eq!(count, 1);
}
