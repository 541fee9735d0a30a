//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::cache::CatalogCache;
use crate::config::ApiConfig;
use crate::services::auth::TokenKeys;
use crate::services::google::{GoogleClient, GoogleError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    tokens: TokenKeys,
    google: GoogleClient,
    catalog: CatalogCache,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the Google HTTP client cannot be built.
    pub fn new(config: ApiConfig, pool: PgPool) -> Result<Self, GoogleError> {
        let tokens = TokenKeys::new(&config.jwt_secret, config.token_ttl);
        let google = GoogleClient::new(&config.google_client_id)?;
        let catalog = CatalogCache::new(config.catalog_cache_ttl);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                tokens,
                google,
                catalog,
            }),
        })
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get the bearer token keys.
    #[must_use]
    pub fn tokens(&self) -> &TokenKeys {
        &self.inner.tokens
    }

    /// Get the Google ID token verifier.
    #[must_use]
    pub fn google(&self) -> &GoogleClient {
        &self.inner.google
    }

    /// Get the catalog cache.
    #[must_use]
    pub fn catalog(&self) -> &CatalogCache {
        &self.inner.catalog
    }
}
