//! Customer sign-in route handlers.

use axum::{extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use bazaar_core::CustomerId;

use crate::db::CustomerRepository;
use crate::error::{ApiJson, AppError, Result};
use crate::response::ok;
use crate::state::AppState;

/// Body carrying a token to exchange or check.
#[derive(Debug, Default, Deserialize)]
pub struct TokenBody {
    #[serde(default)]
    pub token: Option<String>,
}

impl TokenBody {
    fn require(self) -> Result<String> {
        self.token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::BadRequest("Token required".to_string()))
    }
}

/// The signed-in customer as shown to the SPA.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: CustomerId,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
    pub is_admin: bool,
}

/// Response of a successful Google sign-in.
#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub token: String,
    pub user: UserView,
}

/// Exchange a Google ID token for an API token.
///
/// POST /api/auth/google
#[instrument(skip_all)]
pub async fn google(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<TokenBody>,
) -> Result<impl IntoResponse> {
    let id_token = body.require()?;

    let profile = state.google().verify(&id_token).await?;
    let customer = CustomerRepository::new(state.pool())
        .upsert_google(&profile)
        .await?;
    let token = state.tokens().issue_customer(&customer)?;

    tracing::info!(customer_id = %customer.id, "Customer signed in with Google");

    Ok(ok(SignInResponse {
        token,
        user: UserView {
            id: customer.id,
            email: customer.email,
            name: customer.name,
            picture: customer.picture,
            is_admin: customer.is_admin,
        },
    }))
}

/// Return the claims of a valid token.
///
/// POST /api/auth/verify
pub async fn verify(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<TokenBody>,
) -> Result<impl IntoResponse> {
    let token = body.require()?;
    let claims = state.tokens().decode(&token)?;
    Ok(ok(claims))
}
