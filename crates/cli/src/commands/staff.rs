//! Staff flag management.

use uuid::Uuid;

use super::{CommandError, connect};

/// Set the administrator/technician flags on a customer.
///
/// Both flags are written as given; an absent switch clears that flag.
///
/// # Errors
///
/// Returns `CommandError::CustomerNotFound` if no customer has this id.
pub async fn set_flags(
    id: Uuid,
    administrator: bool,
    technician: bool,
) -> Result<(), CommandError> {
    let pool = connect().await?;

    let result = sqlx::query(
        r"
        UPDATE customer
        SET is_administrator = $2, is_technician = $3, updated_at = now()
        WHERE id = $1
        ",
    )
    .bind(id)
    .bind(administrator)
    .bind(technician)
    .execute(&pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(CommandError::CustomerNotFound(id));
    }

    tracing::info!(%id, administrator, technician, "staff flags updated");
    Ok(())
}
