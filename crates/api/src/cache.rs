//! In-memory cache of the public catalog.
//!
//! Storefront traffic is almost entirely `GET /api/products` and
//! `GET /api/products/{id}`, so both are cached with `moka` for a short TTL.
//! Every admin write to products clears the whole cache.
//!
//! Invalidation bumps a generation counter. A read that started before the
//! bump never stores its result, so rows loaded before a write cannot be
//! cached after it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use bazaar_core::ProductId;

use crate::db::{ProductRepository, RepositoryError};
use crate::models::Product;

/// Cache key for catalog reads.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
enum CatalogKey {
    Active,
    Product(ProductId),
}

/// Cached value types.
#[derive(Debug, Clone)]
enum CatalogValue {
    Active(Arc<Vec<Product>>),
    Product(Arc<Product>),
}

/// Cache of active products.
#[derive(Clone)]
pub struct CatalogCache {
    cache: Cache<CatalogKey, CatalogValue>,
    generation: Arc<AtomicU64>,
}

impl CatalogCache {
    /// Create a cache whose entries live for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(ttl)
            .build();
        Self {
            cache,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Cache `value` unless the catalog was invalidated since `seen`.
    async fn store(&self, key: CatalogKey, value: CatalogValue, seen: u64) {
        if self.generation() != seen {
            debug!("Catalog changed during load, not caching");
            return;
        }
        self.cache.insert(key, value).await;
        // An invalidation may have landed between the check and the insert.
        if self.generation() != seen {
            self.cache.invalidate(&key).await;
        }
    }

    /// Active products, from the cache or the database.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the database query fails.
    pub async fn active_products(
        &self,
        products: &ProductRepository<'_>,
    ) -> Result<Arc<Vec<Product>>, RepositoryError> {
        if let Some(CatalogValue::Active(list)) = self.cache.get(&CatalogKey::Active).await {
            debug!("Cache hit for active catalog");
            return Ok(list);
        }

        let seen = self.generation();
        let list = Arc::new(products.list_active().await?);
        self.store(CatalogKey::Active, CatalogValue::Active(Arc::clone(&list)), seen)
            .await;
        Ok(list)
    }

    /// One active product, from the cache or the database.
    ///
    /// Misses are not cached.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the database query fails.
    pub async fn active_product(
        &self,
        products: &ProductRepository<'_>,
        id: ProductId,
    ) -> Result<Option<Arc<Product>>, RepositoryError> {
        let key = CatalogKey::Product(id);
        if let Some(CatalogValue::Product(product)) = self.cache.get(&key).await {
            debug!(product_id = %id, "Cache hit for product");
            return Ok(Some(product));
        }

        let seen = self.generation();
        let Some(product) = products.get_active(id).await? else {
            return Ok(None);
        };
        let product = Arc::new(product);
        self.store(key, CatalogValue::Product(Arc::clone(&product)), seen)
            .await;
        Ok(Some(product))
    }

    /// Drop every cached entry.
    ///
    /// Call after the write has committed.
    pub async fn invalidate_all(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}

impl std::fmt::Debug for CatalogCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogCache")
            .field("entries", &self.cache.entry_count())
            .field("generation", &self.generation())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use bazaar_core::Price;

    use super::*;

    fn product(id: i32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price: Price::from_cents(100),
            image: String::new(),
            stock: 1,
            category: "general".to_string(),
            active: true,
            created_at: Utc::now(),
            updated_at: None,
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn test_invalidate_all_clears_entries() {
        let catalog = CatalogCache::new(Duration::from_secs(60));
        catalog
            .cache
            .insert(
                CatalogKey::Product(ProductId::new(1)),
                CatalogValue::Product(Arc::new(product(1))),
            )
            .await;
        catalog
            .cache
            .insert(
                CatalogKey::Active,
                CatalogValue::Active(Arc::new(vec![product(1)])),
            )
            .await;
        assert!(catalog.cache.get(&CatalogKey::Active).await.is_some());

        catalog.invalidate_all().await;

        assert!(catalog.cache.get(&CatalogKey::Active).await.is_none());
        assert!(
            catalog
                .cache
                .get(&CatalogKey::Product(ProductId::new(1)))
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_load_started_before_invalidation_is_not_cached() {
        let catalog = CatalogCache::new(Duration::from_secs(60));
        let seen = catalog.generation();

        // An admin write commits while the read is in flight.
        catalog.invalidate_all().await;

        catalog
            .store(
                CatalogKey::Active,
                CatalogValue::Active(Arc::new(vec![product(1)])),
                seen,
            )
            .await;
        assert!(catalog.cache.get(&CatalogKey::Active).await.is_none());

        let fresh = catalog.generation();
        catalog
            .store(
                CatalogKey::Active,
                CatalogValue::Active(Arc::new(vec![product(2)])),
                fresh,
            )
            .await;
        assert!(catalog.cache.get(&CatalogKey::Active).await.is_some());
    }
}
