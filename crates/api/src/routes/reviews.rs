//! Review route handlers.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use bazaar_core::{ProductId, ReviewId};

use super::parse_id;
use crate::db::{RepositoryError, ReviewRepository};
use crate::error::{ApiJson, AppError, Result};
use crate::middleware::{RequireAdmin, RequireCustomer};
use crate::response::{created, message, ok};
use crate::services::reviews::{self, ReviewRequest};
use crate::state::AppState;

/// Approval form.
#[derive(Debug, Default, Deserialize)]
pub struct ApprovalForm {
    #[serde(default)]
    pub approved: bool,
}

fn not_found(e: RepositoryError) -> AppError {
    match e {
        RepositoryError::NotFound => AppError::NotFound("Review not found".to_string()),
        other => AppError::Database(other),
    }
}

/// Review a product from a delivered order.
///
/// POST /api/reviews
pub async fn create(
    RequireCustomer(customer): RequireCustomer,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ReviewRequest>,
) -> Result<impl IntoResponse> {
    let review =
        reviews::submit_review(state.pool(), customer.id, &customer.name, request).await?;
    Ok(created(review))
}

/// Approved reviews of a product, newest first.
///
/// GET /api/reviews/product/{productId}
pub async fn for_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<impl IntoResponse> {
    let product_id: ProductId = parse_id(&product_id, "product")?;
    let reviews = ReviewRepository::new(state.pool())
        .list_approved(product_id)
        .await?;
    Ok(ok(reviews))
}

/// Review count and average rating of a product.
///
/// GET /api/reviews/product/{productId}/summary
pub async fn summary(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<impl IntoResponse> {
    let product_id: ProductId = parse_id(&product_id, "product")?;
    let summary = ReviewRepository::new(state.pool())
        .summary(product_id)
        .await?;
    Ok(ok(summary))
}

/// Every review, newest first.
///
/// GET /api/reviews/admin/all
pub async fn admin_index(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    let reviews = ReviewRepository::new(state.pool()).list_all().await?;
    Ok(ok(reviews))
}

/// Approve or hide a review.
///
/// PUT /api/reviews/{id}/approve
#[instrument(skip_all, fields(admin = %admin.username))]
pub async fn approve(
    admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(form): ApiJson<ApprovalForm>,
) -> Result<impl IntoResponse> {
    let id: ReviewId = parse_id(&id, "review")?;
    let review = ReviewRepository::new(state.pool())
        .set_approved(id, form.approved)
        .await
        .map_err(not_found)?;

    tracing::info!(review_id = %id, approved = form.approved, "Review moderated");
    Ok(ok(review))
}

/// Delete a review.
///
/// DELETE /api/reviews/{id}
#[instrument(skip_all, fields(admin = %admin.username))]
pub async fn delete(
    admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id: ReviewId = parse_id(&id, "review")?;
    ReviewRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(not_found)?;

    tracing::info!(review_id = %id, "Review deleted");
    Ok(message("Review deleted successfully"))
}
