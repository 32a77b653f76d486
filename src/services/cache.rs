use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::models::{GeoPoint, SortStrategy};

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cache miss: {0}")]
    CacheMiss(String),
}

/// Two-tier cache for ranked result pages
///
/// L1 is an in-process moka cache and is always present. L2 is Redis, shared
/// across instances, and only used when a URL is configured.
pub struct CacheManager {
    redis: Option<Arc<tokio::sync::Mutex<ConnectionManager>>>,
    l1_cache: moka::future::Cache<String, Vec<u8>>,
    ttl_secs: u64,
}

impl CacheManager {
    /// Create a cache manager backed by Redis
    pub async fn new(redis_url: &str, l1_size: u64, ttl_secs: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;

        Ok(Self {
            redis: Some(Arc::new(tokio::sync::Mutex::new(redis))),
            ..Self::in_memory(l1_size, ttl_secs)
        })
    }

    /// Create a cache manager with only the in-process tier
    pub fn in_memory(l1_size: u64, ttl_secs: u64) -> Self {
        let l1_cache = moka::future::CacheBuilder::new(l1_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self {
            redis: None,
            l1_cache,
            ttl_secs,
        }
    }

    /// Connect to Redis when a URL is given, otherwise stay in-process
    pub async fn from_settings(
        redis_url: Option<&str>,
        l1_size: u64,
        ttl_secs: u64,
    ) -> Result<Self, CacheError> {
        match redis_url {
            Some(url) => {
                tracing::info!("Connecting to Redis cache");
                Self::new(url, l1_size, ttl_secs).await
            }
            None => {
                tracing::info!("No Redis URL configured, using in-process cache only");
                Ok(Self::in_memory(l1_size, ttl_secs))
            }
        }
    }

    pub fn has_shared_tier(&self) -> bool {
        self.redis.is_some()
    }

    /// Get a value from cache (L1 first, then L2)
    pub async fn get<T>(&self, key: &str) -> Result<T, CacheError>
    where
        T: for<'de> Deserialize<'de>,
    {
        if let Some(bytes) = self.l1_cache.get(key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(serde_json::from_slice(&bytes)?);
        }

        if let Some(redis) = &self.redis {
            let mut conn = redis.lock().await;
            let value: Option<String> = redis::cmd("GET")
                .arg(key)
                .query_async(&mut *conn)
                .await?;
            drop(conn);

            if let Some(json) = value {
                tracing::trace!("L2 cache hit: {}", key);
                let parsed = serde_json::from_str(&json)?;
                self.l1_cache.insert(key.to_string(), json.into_bytes()).await;
                return Ok(parsed);
            }
        }

        tracing::trace!("Cache miss: {}", key);
        Err(CacheError::CacheMiss(key.to_string()))
    }

    /// Set a value in every configured tier
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let json = serde_json::to_string(value)?;
        self.l1_cache.insert(key.to_string(), json.as_bytes().to_vec()).await;

        if let Some(redis) = &self.redis {
            let mut conn = redis.lock().await;
            redis::cmd("SETEX")
                .arg(key)
                .arg(self.ttl_secs)
                .arg(json)
                .query_async::<()>(&mut *conn)
                .await?;
        }

        tracing::trace!("Cache set: {}", key);
        Ok(())
    }

    /// Health check for the shared tier; always healthy when running in-process
    pub async fn health_check(&self) -> Result<bool, CacheError> {
        let Some(redis) = &self.redis else {
            return Ok(true);
        };

        let mut conn = redis.lock().await;
        let pong: String = redis::cmd("PING").query_async(&mut *conn).await?;
        Ok(pong == "PONG")
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Key for a nearby page
    ///
    /// Coordinates keep full precision since cached pages carry the
    /// distance from this exact center.
    pub fn nearby(
        center: &GeoPoint,
        radius_km: f64,
        sort: SortStrategy,
        page_index: i64,
        page_size: i64,
    ) -> String {
        format!(
            "nearby:{}:{}:{}:{}:{}:{}",
            center.latitude,
            center.longitude,
            radius_km,
            sort.as_str(),
            page_index,
            page_size
        )
    }
}
