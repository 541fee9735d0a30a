//! Review repository.

use sqlx::PgPool;

use bazaar_core::{CustomerId, OrderId, ProductId, ReviewId};

use super::{RepositoryError, conflict_on_unique};
use crate::models::Review;
use crate::models::review::{NewReview, ReviewSummary};

const REVIEW_COLUMNS: &str = "id, product_id, customer_id, order_id, user_name, rating, comment, \
                              approved, created_at, updated_at";

/// Repository for product reviews.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Whether the customer already reviewed this product for this order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(
        &self,
        product_id: ProductId,
        customer_id: CustomerId,
        order_id: OrderId,
    ) -> Result<bool, RepositoryError> {
        let found: (bool,) = sqlx::query_as(
            r"
            SELECT EXISTS (
                SELECT 1 FROM shop.review
                WHERE product_id = $1 AND customer_id = $2 AND order_id = $3
            )
            ",
        )
        .bind(product_id)
        .bind(customer_id)
        .bind(order_id)
        .fetch_one(self.pool)
        .await?;
        Ok(found.0)
    }

    /// Insert an approved review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the same review already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, review: &NewReview) -> Result<Review, RepositoryError> {
        sqlx::query_as::<_, Review>(&format!(
            r"
            INSERT INTO shop.review (product_id, customer_id, order_id, user_name, rating, comment)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {REVIEW_COLUMNS}
            "
        ))
        .bind(review.product_id)
        .bind(review.customer_id)
        .bind(review.order_id)
        .bind(&review.user_name)
        .bind(review.rating)
        .bind(&review.comment)
        .fetch_one(self.pool)
        .await
        .map_err(conflict_on_unique("review already exists"))
    }

    /// Approved reviews of a product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_approved(&self, product_id: ProductId) -> Result<Vec<Review>, RepositoryError> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            r"
            SELECT {REVIEW_COLUMNS}
            FROM shop.review
            WHERE product_id = $1 AND approved
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;
        Ok(reviews)
    }

    /// Count and mean rating of a product's approved reviews.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn summary(&self, product_id: ProductId) -> Result<ReviewSummary, RepositoryError> {
        let summary = sqlx::query_as::<_, ReviewSummary>(
            r"
            SELECT COUNT(*) AS count,
                   ROUND(AVG(rating)::NUMERIC, 1)::FLOAT8 AS average
            FROM shop.review
            WHERE product_id = $1 AND approved
            ",
        )
        .bind(product_id)
        .fetch_one(self.pool)
        .await?;
        Ok(summary)
    }

    /// Every review, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Review>, RepositoryError> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM shop.review ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(reviews)
    }

    /// Approve or hide a review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_approved(&self, id: ReviewId, approved: bool) -> Result<Review, RepositoryError> {
        sqlx::query_as::<_, Review>(&format!(
            r"
            UPDATE shop.review
            SET approved = $2, updated_at = now()
            WHERE id = $1
            RETURNING {REVIEW_COLUMNS}
            "
        ))
        .bind(id)
        .bind(approved)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: ReviewId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.review WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
