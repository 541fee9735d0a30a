//! Order repository.

use std::collections::HashMap;

use sqlx::{PgConnection, PgPool};

use bazaar_core::{CustomerId, OrderId, OrderStatus, Price, ProductId};

use super::RepositoryError;
use crate::models::order::{Order, OrderItem, OrderRow, ShippingInfo};

const ORDER_COLUMNS: &str = "id, customer_id, customer_name, customer_email, shipping_info, \
                             total_amount, status, created_at, updated_at, processing_at, \
                             shipped_at, delivered_at, cancelled_at";

/// Repository for placed orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Orders of one customer, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM shop.customer_order
            WHERE customer_id = $1
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(customer_id)
        .fetch_all(self.pool)
        .await?;
        self.attach_items(rows).await
    }

    /// Every order, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        self.list_recent(None).await
    }

    /// The newest orders, optionally limited.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_recent(&self, limit: Option<i64>) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM shop.customer_order
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            "
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        self.attach_items(rows).await
    }

    /// Get an order by ID, optionally restricted to one customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(
        &self,
        id: OrderId,
        owner: Option<CustomerId>,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM shop.customer_order
            WHERE id = $1 AND ($2::INT IS NULL OR customer_id = $2)
            "
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.attach_items(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Set an order's status, stamping `updated_at` and the status timestamp.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            UPDATE shop.customer_order
            SET status = $2,
                updated_at = now(),
                processing_at = CASE WHEN $2 = 'processing' THEN now() ELSE processing_at END,
                shipped_at = CASE WHEN $2 = 'shipped' THEN now() ELSE shipped_at END,
                delivered_at = CASE WHEN $2 = 'delivered' THEN now() ELSE delivered_at END,
                cancelled_at = CASE WHEN $2 = 'cancelled' THEN now() ELSE cancelled_at END
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        self.attach_items(vec![row])
            .await?
            .pop()
            .ok_or(RepositoryError::NotFound)
    }

    /// Load the items for a batch of order rows with a single query.
    async fn attach_items(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = rows.iter().map(|r| r.id.as_i32()).collect();
        let items = sqlx::query_as::<_, OrderItem>(
            r"
            SELECT id, order_id, product_id, name, price, quantity, image
            FROM shop.order_item
            WHERE order_id = ANY($1)
            ORDER BY id
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for item in items {
            by_order.entry(item.order_id).or_default().push(item);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let items = by_order.remove(&row.id).unwrap_or_default();
                Order::from_parts(row, items)
            })
            .collect())
    }
}

/// Header fields of an order about to be inserted.
#[derive(Debug, Clone)]
pub struct OrderHeader<'a> {
    pub customer_id: CustomerId,
    pub customer_name: &'a str,
    pub customer_email: &'a str,
    pub shipping_info: &'a ShippingInfo,
    pub total_amount: Price,
}

/// A line to insert, priced from the catalog.
#[derive(Debug, Clone)]
pub struct ItemSnapshot {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub quantity: i32,
    pub image: String,
}

/// Insert an order and its items inside an open transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if an insert fails.
pub async fn insert(
    conn: &mut PgConnection,
    header: &OrderHeader<'_>,
    items: &[ItemSnapshot],
) -> Result<Order, RepositoryError> {
    let row = sqlx::query_as::<_, OrderRow>(&format!(
        r"
        INSERT INTO shop.customer_order
            (customer_id, customer_name, customer_email, shipping_info, total_amount,
             status, processing_at)
        VALUES ($1, $2, $3, $4, $5, 'processing', now())
        RETURNING {ORDER_COLUMNS}
        "
    ))
    .bind(header.customer_id)
    .bind(header.customer_name)
    .bind(header.customer_email)
    .bind(sqlx::types::Json(header.shipping_info))
    .bind(header.total_amount)
    .fetch_one(&mut *conn)
    .await?;

    let mut inserted = Vec::with_capacity(items.len());
    for item in items {
        let line = sqlx::query_as::<_, OrderItem>(
            r"
            INSERT INTO shop.order_item (order_id, product_id, name, price, quantity, image)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, order_id, product_id, name, price, quantity, image
            ",
        )
        .bind(row.id)
        .bind(item.product_id)
        .bind(&item.name)
        .bind(item.price)
        .bind(item.quantity)
        .bind(&item.image)
        .fetch_one(&mut *conn)
        .await?;
        inserted.push(line);
    }

    Ok(Order::from_parts(row, inserted))
}
