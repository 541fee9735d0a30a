//! Dashboard aggregates.

use serde::Serialize;
use sqlx::PgPool;

use bazaar_core::{OrderStatus, Price};

use super::RepositoryError;

/// Counters shown on the admin dashboard.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StoreCounts {
    pub total_products: i64,
    pub active_products: i64,
    pub total_orders: i64,
    pub total_reviews: i64,
    pub total_messages: i64,
    pub unread_messages: i64,
    /// Sum of order totals, excluding cancelled orders.
    pub total_revenue: Price,
}

/// Statuses whose orders are summed into revenue.
fn revenue_statuses() -> Vec<&'static str> {
    OrderStatus::ALL
        .iter()
        .filter(|status| status.counts_as_revenue())
        .map(OrderStatus::as_str)
        .collect()
}

/// Compute all dashboard counters in one round trip.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn store_counts(pool: &PgPool) -> Result<StoreCounts, RepositoryError> {
    let counts = sqlx::query_as::<_, StoreCounts>(
        r"
        SELECT
            (SELECT COUNT(*) FROM shop.product) AS total_products,
            (SELECT COUNT(*) FROM shop.product WHERE active) AS active_products,
            (SELECT COUNT(*) FROM shop.customer_order) AS total_orders,
            (SELECT COUNT(*) FROM shop.review) AS total_reviews,
            (SELECT COUNT(*) FROM shop.contact_message) AS total_messages,
            (SELECT COUNT(*) FROM shop.contact_message WHERE NOT read) AS unread_messages,
            (SELECT COALESCE(SUM(total_amount), 0)::NUMERIC(12, 2)
               FROM shop.customer_order
              WHERE status::text = ANY($1)) AS total_revenue
        ",
    )
    .bind(revenue_statuses())
    .fetch_one(pool)
    .await?;
    Ok(counts)
}
