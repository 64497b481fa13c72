//! Service catalog seeding.

use roadcall_core::ServiceCategory;

use super::{CommandError, connect};

/// The default catalog. Durations are the fixed per-job minutes copied onto
/// jobs at intake.
const CATALOG: &[(&str, ServiceCategory, i32)] = &[
    ("ADAS Calibration", ServiceCategory::Adas, 90),
    ("Airbag Module Service", ServiceCategory::Airbag, 60),
    ("Key & Immobilizer Programming", ServiceCategory::Immo, 60),
    ("Module Programming", ServiceCategory::Prog, 45),
    ("Diagnostic Scan", ServiceCategory::Diag, 30),
];

/// Insert any missing catalog entries. Existing entries are left alone.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    for &(name, category, duration_minutes) in CATALOG {
        let result = sqlx::query(
            r"
            INSERT INTO service (name, category, duration_minutes)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO NOTHING
            ",
        )
        .bind(name)
        .bind(category)
        .bind(duration_minutes)
        .execute(&pool)
        .await?;

        if result.rows_affected() > 0 {
            tracing::info!(name, %category, "seeded service");
        } else {
            tracing::info!(name, "service already present");
        }
    }

    Ok(())
}
