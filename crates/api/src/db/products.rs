//! Product repository.

use sqlx::{PgConnection, PgPool};

use bazaar_core::{Price, ProductId};

use super::RepositoryError;
use crate::models::Product;
use crate::models::product::{NewProduct, ProductChanges};

const PRODUCT_COLUMNS: &str = "id, name, description, price, image, stock, category, active, \
                               created_at, updated_at, deleted_at";

/// Repository for catalog products.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products visible in the storefront.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.product WHERE active ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }

    /// List every product, including soft-deleted ones.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.product ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }

    /// Get an active product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_active(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.product WHERE id = $1 AND active"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(product)
    }

    /// Current stock and pricing for the given products, without locking.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stock_rows(&self, ids: &[ProductId]) -> Result<Vec<StockRow>, RepositoryError> {
        let raw: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();
        let rows = sqlx::query_as::<_, StockRow>(
            "SELECT id, name, price, image, stock, active FROM shop.product WHERE id = ANY($1)",
        )
        .bind(&raw)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Insert a new active product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        insert(&mut conn, product).await
    }

    /// Insert a batch of products in one transaction, optionally retiring
    /// the current catalog first.
    ///
    /// Either every product is inserted (and, with `replace`, every
    /// previously active product deactivated) or nothing changes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; the
    /// transaction is rolled back.
    pub async fn import(
        &self,
        products: &[NewProduct],
        replace: bool,
    ) -> Result<CatalogImport, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let deactivated = if replace {
            deactivate_all(&mut tx).await?
        } else {
            0
        };

        let mut created = Vec::with_capacity(products.len());
        for product in products {
            created.push(insert(&mut tx, product).await?);
        }

        tx.commit().await?;
        Ok(CatalogImport {
            deactivated,
            created,
        })
    }

    /// Apply a partial update and return the updated row.
    ///
    /// Re-activating a product clears `deleted_at`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            r"
            UPDATE shop.product
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                image = COALESCE($5, image),
                stock = COALESCE($6, stock),
                category = COALESCE($7, category),
                active = COALESCE($8, active),
                deleted_at = CASE WHEN $8 IS TRUE THEN NULL ELSE deleted_at END,
                updated_at = now()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.price)
        .bind(changes.image.as_deref())
        .bind(changes.stock)
        .bind(changes.category.as_deref())
        .bind(changes.active)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Soft-delete a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn deactivate(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.product
            SET active = FALSE, deleted_at = now()
            WHERE id = $1
            ",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

/// Outcome of [`ProductRepository::import`].
#[derive(Debug)]
pub struct CatalogImport {
    /// Previously active products that were soft-deleted.
    pub deactivated: u64,
    pub created: Vec<Product>,
}

/// Insert a new active product on an existing connection.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert(conn: &mut PgConnection, product: &NewProduct) -> Result<Product, RepositoryError> {
    let created = sqlx::query_as::<_, Product>(&format!(
        r"
        INSERT INTO shop.product (name, description, price, image, stock, category)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {PRODUCT_COLUMNS}
        "
    ))
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price)
    .bind(&product.image)
    .bind(product.stock)
    .bind(&product.category)
    .fetch_one(&mut *conn)
    .await?;
    Ok(created)
}

/// Soft-delete every active product. Returns how many were deactivated.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the update fails.
pub async fn deactivate_all(conn: &mut PgConnection) -> Result<u64, RepositoryError> {
    let result =
        sqlx::query("UPDATE shop.product SET active = FALSE, deleted_at = now() WHERE active")
            .execute(&mut *conn)
            .await?;
    Ok(result.rows_affected())
}

/// Stock and pricing facts for a product being checked out.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StockRow {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub image: String,
    pub stock: i32,
    pub active: bool,
}

/// Lock the given products for the rest of the transaction.
///
/// Rows are locked in ascending ID order so concurrent checkouts touching
/// overlapping products cannot deadlock.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lock_for_checkout(
    conn: &mut PgConnection,
    ids: &[ProductId],
) -> Result<Vec<StockRow>, RepositoryError> {
    let raw: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();
    let rows = sqlx::query_as::<_, StockRow>(
        r"
        SELECT id, name, price, image, stock, active
        FROM shop.product
        WHERE id = ANY($1)
        ORDER BY id
        FOR UPDATE
        ",
    )
    .bind(&raw)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

/// Take `quantity` units out of stock if that many are available.
///
/// Returns `false` (and changes nothing) when stock is insufficient.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the update fails.
pub async fn take_stock(
    conn: &mut PgConnection,
    id: ProductId,
    quantity: i32,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        r"
        UPDATE shop.product
        SET stock = stock - $2
        WHERE id = $1 AND stock >= $2
        ",
    )
    .bind(id)
    .bind(quantity)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected() == 1)
}
