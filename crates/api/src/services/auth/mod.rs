//! Authentication service.
//!
//! Customers authenticate with Google (see [`crate::services::google`]) and
//! admins with a username and password. Both end up holding a bearer token
//! issued by [`TokenKeys`].

mod error;
mod password;
mod token;

pub use error::AuthError;
pub use password::{MIN_PASSWORD_LENGTH, hash_password, validate_password, verify_password};
pub use token::{Claims, Principal, PrincipalKind, TokenKeys};

use sqlx::PgPool;

use crate::db::{AdminRepository, RepositoryError};
use crate::models::AdminAccount;

/// Accounts created on first login when default-admin seeding is enabled.
const DEFAULT_ADMINS: [(&str, &str); 2] = [("admin1", "admin1"), ("admin2", "admin2")];

/// Admin account management and login.
pub struct AdminAuthService<'a> {
    admins: AdminRepository<'a>,
}

impl<'a> AdminAuthService<'a> {
    /// Create a new admin authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            admins: AdminRepository::new(pool),
        }
    }

    /// Create an admin account with a validated password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::AdminAlreadyExists` if the username is taken.
    pub async fn create_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AdminAccount, AuthError> {
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        self.admins
            .create(username.trim(), &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::AdminAlreadyExists,
                other => AuthError::Repository(other),
            })
    }

    /// Login with username and password.
    ///
    /// When `seed_defaults` is set and no admin exists yet, the default
    /// accounts are created first.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username or password is wrong.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        seed_defaults: bool,
    ) -> Result<AdminAccount, AuthError> {
        if seed_defaults {
            self.seed_default_admins().await?;
        }

        let admin = self
            .admins
            .get_by_username(username.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &admin.password_hash)?;

        Ok(admin)
    }

    async fn seed_default_admins(&self) -> Result<(), AuthError> {
        if self.admins.count().await? > 0 {
            return Ok(());
        }

        for (username, password) in DEFAULT_ADMINS {
            let hash = hash_password(password)?;
            match self.admins.create(username, &hash).await {
                // Another request seeded concurrently.
                Ok(_) | Err(RepositoryError::Conflict(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }

        tracing::warn!("Seeded default admin accounts; change their passwords");
        Ok(())
    }
}
