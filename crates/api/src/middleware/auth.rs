//! Bearer token extractors.
//!
//! Handlers declare what they need by taking one of these extractors:
//!
//! - [`RequireAuth`] - any valid token
//! - [`RequireCustomer`] - a customer token (Google sign-in)
//! - [`RequireAdmin`] - an admin token
//!
//! Rejections use the JSON error envelope.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use bazaar_core::CustomerId;

use crate::error::{AppError, set_sentry_user};
use crate::services::auth::Principal;
use crate::state::AppState;

/// Read the token from `Authorization: Bearer <token>`.
fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Decode and verify the caller's token.
fn authenticate(parts: &Parts, state: &AppState) -> Result<Principal, AppError> {
    let token =
        bearer_token(parts).ok_or_else(|| AppError::Unauthorized("No token provided".to_string()))?;

    let claims = state
        .tokens()
        .decode(token)
        .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))?;
    let principal = claims
        .principal()
        .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))?;

    match &principal {
        Principal::Customer { id, .. } => set_sentry_user(id, None),
        Principal::Admin { id, username } => set_sentry_user(id, Some(username)),
    }

    Ok(principal)
}

/// Extractor that requires any valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireAuth(principal): RequireAuth) -> impl IntoResponse {
///     format!("admin: {}", principal.is_admin())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAuth(pub Principal);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).map(Self)
    }
}

/// Extractor that requires an admin token.
#[derive(Debug, Clone)]
pub struct RequireAdmin {
    pub username: String,
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match authenticate(parts, state)? {
            Principal::Admin { username, .. } => Ok(Self { username }),
            Principal::Customer { .. } => {
                Err(AppError::Forbidden("Admin access required".to_string()))
            }
        }
    }
}

/// A signed-in customer.
#[derive(Debug, Clone)]
pub struct CurrentCustomer {
    pub id: CustomerId,
    pub email: String,
    pub name: String,
}

/// Extractor that requires a customer token.
#[derive(Debug, Clone)]
pub struct RequireCustomer(pub CurrentCustomer);

impl FromRequestParts<AppState> for RequireCustomer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match authenticate(parts, state)? {
            Principal::Customer { id, email, name } => {
                Ok(Self(CurrentCustomer { id, email, name }))
            }
            Principal::Admin { .. } => {
                Err(AppError::Forbidden("Customer account required".to_string()))
            }
        }
    }
}
