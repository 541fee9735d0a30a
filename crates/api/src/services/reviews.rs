//! Review submission rules.
//!
//! A customer may review a product once per delivered order that contains it.

use serde::Deserialize;
use serde_json::Value;
use sqlx::PgPool;

use bazaar_core::{CustomerId, OrderId, ProductId, Rating};

use crate::db::{OrderRepository, RepositoryError, ReviewRepository};
use crate::models::Review;
use crate::models::order::Order;
use crate::models::review::NewReview;

/// Reasons a review is refused.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("Product ID, order ID, and rating are required")]
    MissingFields,

    #[error("Rating must be between 1 and 5")]
    InvalidRating,

    #[error("Order not found or not delivered yet")]
    OrderNotEligible,

    #[error("Product not found in this order")]
    ProductNotInOrder,

    #[error("You have already reviewed this product")]
    AlreadyReviewed,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Body of `POST /api/reviews`.
///
/// `rating` stays loosely typed so range errors get their own message.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub product_id: Option<ProductId>,
    pub order_id: Option<OrderId>,
    #[serde(default)]
    pub rating: Value,
    pub comment: Option<String>,
}

/// Parse a submitted rating: an integer or an integer string in `1..=5`.
///
/// # Errors
///
/// Returns `ReviewError::MissingFields` when absent and
/// `ReviewError::InvalidRating` for anything else outside the range.
pub fn parse_rating(raw: &Value) -> Result<Rating, ReviewError> {
    let value = match raw {
        Value::Null => return Err(ReviewError::MissingFields),
        Value::Number(n) => n.as_i64(),
        Value::String(s) if s.trim().is_empty() => return Err(ReviewError::MissingFields),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    value
        .and_then(|v| Rating::new(v).ok())
        .ok_or(ReviewError::InvalidRating)
}

/// Check that `order` (already filtered to the caller) allows reviewing `product_id`.
///
/// # Errors
///
/// Returns `ReviewError::OrderNotEligible` if the order is missing or not
/// delivered, and `ReviewError::ProductNotInOrder` if it lacks the product.
pub fn check_eligibility(order: Option<&Order>, product_id: ProductId) -> Result<(), ReviewError> {
    let order = order
        .filter(|o| o.status.allows_reviews())
        .ok_or(ReviewError::OrderNotEligible)?;

    if !order.contains_product(product_id) {
        return Err(ReviewError::ProductNotInOrder);
    }
    Ok(())
}

/// Validate and store a review from `customer_id`.
///
/// # Errors
///
/// Returns the matching `ReviewError` when a rule is violated, or
/// `ReviewError::Repository` if the database fails.
#[tracing::instrument(skip(pool, user_name, request))]
pub async fn submit_review(
    pool: &PgPool,
    customer_id: CustomerId,
    user_name: &str,
    request: ReviewRequest,
) -> Result<Review, ReviewError> {
    let (Some(product_id), Some(order_id)) = (request.product_id, request.order_id) else {
        return Err(ReviewError::MissingFields);
    };
    let rating = parse_rating(&request.rating)?;

    let order = OrderRepository::new(pool)
        .get(order_id, Some(customer_id))
        .await?;
    check_eligibility(order.as_ref(), product_id)?;

    let reviews = ReviewRepository::new(pool);
    if reviews.exists(product_id, customer_id, order_id).await? {
        return Err(ReviewError::AlreadyReviewed);
    }

    let review = reviews
        .create(&NewReview {
            product_id,
            customer_id,
            order_id,
            user_name: user_name.to_owned(),
            rating,
            comment: request.comment.unwrap_or_default(),
        })
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => ReviewError::AlreadyReviewed,
            other => ReviewError::Repository(other),
        })?;

    tracing::info!(review_id = %review.id, "Review created");
    Ok(review)
}
