//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown username or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The bearer token is malformed, tampered with, or expired.
    #[error("invalid token: {0}")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    /// The token decoded but its claims don't describe a usable principal.
    #[error("token claims are inconsistent: {0}")]
    MalformedClaims(&'static str),

    /// A token could not be signed.
    #[error("failed to issue token: {0}")]
    TokenIssue(#[source] jsonwebtoken::errors::Error),

    /// Username already taken.
    #[error("admin already exists")]
    AdminAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
