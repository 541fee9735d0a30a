//! Admin account management.

use bazaar_api::services::auth::AdminAuthService;

use super::{CommandError, connect};

/// Create an admin account.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` for passwords under 8 characters and
/// `AuthError::AdminAlreadyExists` if the username is taken.
pub async fn create(username: &str, password: &str) -> Result<(), CommandError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(CommandError::InvalidArgument("username must not be blank"));
    }
    let pool = connect().await?;

    tracing::info!(%username, "Creating admin account");
    let admin = AdminAuthService::new(&pool)
        .create_admin(username, password)
        .await?;

    tracing::info!(admin_id = %admin.id, %username, "Admin account created");
    Ok(())
}
