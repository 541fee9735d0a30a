//! Cart quote handler.
//!
//! The cart itself lives in the browser. This endpoint prices it against the
//! current catalog so the checkout page shows authoritative totals.

use axum::{extract::State, response::IntoResponse};
use serde::Deserialize;

use bazaar_core::ProductId;

use crate::db::ProductRepository;
use crate::error::{ApiJson, Result};
use crate::response::ok;
use crate::services::checkout::{self, CheckoutError, LineInput};
use crate::state::AppState;

/// Body of a quote request.
#[derive(Debug, Default, Deserialize)]
pub struct QuoteRequest {
    #[serde(default)]
    pub items: Vec<LineInput>,
}

/// Price a cart.
///
/// POST /api/cart/quote
pub async fn quote(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<QuoteRequest>,
) -> Result<impl IntoResponse> {
    if request.items.is_empty() {
        return Err(CheckoutError::EmptyCart.into());
    }
    let lines = checkout::merge_lines(&request.items)?;

    let ids: Vec<ProductId> = lines.iter().map(|line| line.product_id).collect();
    let rows = ProductRepository::new(state.pool()).stock_rows(&ids).await?;

    Ok(ok(checkout::quote(&lines, &rows)?))
}
