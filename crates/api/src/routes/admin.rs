//! Admin login and dashboard route handlers.

use axum::{extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use bazaar_core::AdminId;

use crate::db::OrderRepository;
use crate::db::stats::{self, StoreCounts};
use crate::error::{ApiJson, AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::Order;
use crate::response::ok;
use crate::services::auth::AdminAuthService;
use crate::state::AppState;

/// Orders shown on the dashboard.
const RECENT_ORDERS: i64 = 5;

/// Admin login form.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// The signed-in admin as shown to the SPA.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminView {
    pub id: AdminId,
    pub username: String,
    pub is_admin: bool,
}

/// Response of a successful admin login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub admin: AdminView,
}

/// Dashboard payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(flatten)]
    pub counts: StoreCounts,
    pub recent_orders: Vec<Order>,
}

/// Log in with username and password.
///
/// POST /api/admin/login
#[instrument(skip_all, fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<LoginForm>,
) -> Result<impl IntoResponse> {
    if form.username.trim().is_empty() || form.password.is_empty() {
        return Err(AppError::BadRequest(
            "Username and password required".to_string(),
        ));
    }

    let admin = AdminAuthService::new(state.pool())
        .login(
            &form.username,
            &form.password,
            state.config().seed_default_admins,
        )
        .await?;
    let token = state.tokens().issue_admin(&admin)?;

    tracing::info!(admin_id = %admin.id, "Admin logged in");

    Ok(ok(LoginResponse {
        token,
        admin: AdminView {
            id: admin.id,
            username: admin.username,
            is_admin: true,
        },
    }))
}

/// Store-wide counters and the latest orders.
///
/// GET /api/admin/stats
pub async fn stats(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    let counts = stats::store_counts(state.pool()).await?;
    let recent_orders = OrderRepository::new(state.pool())
        .list_recent(Some(RECENT_ORDERS))
        .await?;

    Ok(ok(DashboardStats {
        counts,
        recent_orders,
    }))
}
