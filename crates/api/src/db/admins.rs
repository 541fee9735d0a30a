//! Admin account repository.

use sqlx::PgPool;

use super::{RepositoryError, conflict_on_unique};
use crate::models::AdminAccount;

/// Repository for back-office accounts.
pub struct AdminRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminRepository<'a> {
    /// Create a new admin repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Number of admin accounts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM shop.admin_account")
            .fetch_one(self.pool)
            .await?;
        Ok(count.0)
    }

    /// Look up an admin by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AdminAccount>, RepositoryError> {
        let admin = sqlx::query_as::<_, AdminAccount>(
            r"
            SELECT id, username, password_hash, created_at
            FROM shop.admin_account
            WHERE username = $1
            ",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;
        Ok(admin)
    }

    /// Create an admin account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<AdminAccount, RepositoryError> {
        sqlx::query_as::<_, AdminAccount>(
            r"
            INSERT INTO shop.admin_account (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, password_hash, created_at
            ",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(conflict_on_unique("username already exists"))
    }
}
