//! Product review.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::{CustomerId, OrderId, ProductId, Rating, ReviewId};

/// A review left by a customer for a product from one of their delivered orders.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: ReviewId,
    pub product_id: ProductId,
    #[serde(rename = "userId")]
    pub customer_id: CustomerId,
    pub order_id: OrderId,
    pub user_name: String,
    pub rating: Rating,
    pub comment: String,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A review that passed the eligibility checks.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub product_id: ProductId,
    pub customer_id: CustomerId,
    pub order_id: OrderId,
    pub user_name: String,
    pub rating: Rating,
    pub comment: String,
}

/// Aggregate of approved reviews for one product.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub count: i64,
    /// Mean rating rounded to one decimal, `None` without reviews.
    pub average: Option<f64>,
}
