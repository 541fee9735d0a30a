//! Order route handlers.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use bazaar_core::{OrderId, OrderStatus};

use super::parse_id;
use crate::db::{OrderRepository, RepositoryError};
use crate::error::{ApiJson, AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth, RequireCustomer};
use crate::response::{created, ok};
use crate::services::checkout::{self, Buyer, PlaceOrderRequest};
use crate::state::AppState;

/// Status update form.
#[derive(Debug, Default, Deserialize)]
pub struct StatusForm {
    #[serde(default)]
    pub status: String,
}

fn parse_status(raw: &str) -> Result<OrderStatus> {
    raw.parse()
        .map_err(|_| AppError::BadRequest("Invalid status".to_string()))
}

fn order_not_found() -> AppError {
    AppError::NotFound("Order not found".to_string())
}

/// Place an order for the signed-in customer.
///
/// POST /api/orders
pub async fn create(
    RequireCustomer(customer): RequireCustomer,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PlaceOrderRequest>,
) -> Result<impl IntoResponse> {
    let buyer = Buyer {
        id: customer.id,
        name: customer.name,
        email: customer.email,
    };
    let order = checkout::place_order(state.pool(), &buyer, request).await?;
    state.catalog().invalidate_all().await;
    Ok(created(order))
}

/// The caller's orders, newest first.
///
/// GET /api/orders/user
pub async fn mine(
    RequireCustomer(customer): RequireCustomer,
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    let orders = OrderRepository::new(state.pool())
        .list_for_customer(customer.id)
        .await?;
    Ok(ok(orders))
}

/// Every order, newest first.
///
/// GET /api/orders/admin/all
pub async fn admin_index(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    let orders = OrderRepository::new(state.pool()).list_all().await?;
    Ok(ok(orders))
}

/// Change an order's status.
///
/// PUT /api/orders/{id}/status
#[instrument(skip_all, fields(admin = %admin.username))]
pub async fn update_status(
    admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(form): ApiJson<StatusForm>,
) -> Result<impl IntoResponse> {
    let id: OrderId = parse_id(&id, "order")?;
    let status = parse_status(&form.status)?;

    let order = OrderRepository::new(state.pool())
        .set_status(id, status)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => order_not_found(),
            other => AppError::Database(other),
        })?;

    tracing::info!(order_id = %id, status = %status, "Order status updated");
    Ok(ok(order))
}

/// One order. Customers only see their own.
///
/// GET /api/orders/{id}
pub async fn show(
    RequireAuth(principal): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id: OrderId = parse_id(&id, "order")?;
    let order = OrderRepository::new(state.pool())
        .get(id, principal.customer_id())
        .await?
        .ok_or_else(order_not_found)?;
    Ok(ok(order))
}
