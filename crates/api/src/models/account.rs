//! Customer and admin account types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::{AdminId, CustomerId};

/// A shopper who signed in with Google.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(rename = "_id")]
    pub id: CustomerId,
    /// Google account subject (`sub` claim).
    pub google_id: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
    /// Always false for Google sign-ins; admins log in separately.
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// A back-office login.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminAccount {
    pub id: AdminId,
    pub username: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
