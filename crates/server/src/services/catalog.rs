//! Catalog service with the featured-products read-through cache.
//!
//! The featured listing is the one hot query on the home page, so it sits
//! behind a `moka` cache under a single fixed key. Admin catalog edits
//! overwrite the cached list; the TTL only bounds staleness if an overwrite
//! is ever missed.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use crate::db::RepositoryError;
use crate::db::products::ProductRepository;
use crate::models::Product;

/// Fixed cache key for the featured product list.
const FEATURED_CACHE_KEY: &str = "featured_products";

/// Staleness bound for the cached list.
const FEATURED_CACHE_TTL: Duration = Duration::from_secs(300);

/// Catalog service wrapping the featured-products cache.
#[derive(Clone)]
pub struct CatalogService {
    cache: Cache<&'static str, Arc<Vec<Product>>>,
}

impl CatalogService {
    /// Create a new catalog service with an empty cache.
    #[must_use]
    pub fn new() -> Self {
        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(FEATURED_CACHE_TTL)
            .build();

        Self { cache }
    }

    /// Featured products, read through the cache.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the cache misses and the query fails.
    pub async fn featured(&self, pool: &PgPool) -> Result<Arc<Vec<Product>>, RepositoryError> {
        if let Some(cached) = self.cache.get(FEATURED_CACHE_KEY).await {
            return Ok(cached);
        }

        self.refresh_featured(pool).await
    }

    /// Re-query the featured list and overwrite the cache. Called after any
    /// admin catalog edit.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn refresh_featured(
        &self,
        pool: &PgPool,
    ) -> Result<Arc<Vec<Product>>, RepositoryError> {
        let products = Arc::new(ProductRepository::new(pool).featured().await?);
        self.cache
            .insert(FEATURED_CACHE_KEY, Arc::clone(&products))
            .await;

        Ok(products)
    }
}

impl Default for CatalogService {
    fn default() -> Self {
        Self::new()
    }
}
