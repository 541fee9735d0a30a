//! Customer repository.

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::Customer;

/// Profile fields taken from a verified Google ID token.
#[derive(Debug, Clone)]
pub struct GoogleProfile {
    pub google_id: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
}

/// Repository for customers.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create the customer for a Google account, or refresh its profile.
    ///
    /// A single upsert keeps two simultaneous first sign-ins from racing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn upsert_google(&self, profile: &GoogleProfile) -> Result<Customer, RepositoryError> {
        let customer = sqlx::query_as::<_, Customer>(
            r"
            INSERT INTO shop.customer (google_id, email, name, picture)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (google_id) DO UPDATE
            SET email = EXCLUDED.email,
                name = EXCLUDED.name,
                picture = EXCLUDED.picture
            RETURNING id, google_id, email, name, picture, is_admin, created_at
            ",
        )
        .bind(&profile.google_id)
        .bind(&profile.email)
        .bind(&profile.name)
        .bind(profile.picture.as_deref())
        .fetch_one(self.pool)
        .await?;
        Ok(customer)
    }
}
