//! Cache backend selection

use std::fmt;
use std::sync::Arc;

use crate::domain::cache::Cache;
use crate::domain::DomainError;

use super::in_memory::{InMemoryCache, InMemoryCacheConfig};
use super::redis::{RedisCache, RedisCacheConfig};

/// A cache backend together with its settings
#[derive(Debug, Clone)]
pub enum CacheBackend {
    /// Process-local moka cache
    InMemory(InMemoryCacheConfig),
    /// Shared Redis instance
    Redis(RedisCacheConfig),
}

impl fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheBackend::InMemory(_) => write!(f, "in_memory"),
            CacheBackend::Redis(_) => write!(f, "redis"),
        }
    }
}

/// Builds the configured cache backend
#[derive(Debug, Default)]
pub struct CacheFactory;

impl CacheFactory {
    pub fn new() -> Self {
        Self
    }

    /// Creates the cache. Redis is connected eagerly so a bad URL fails startup.
    pub async fn create(&self, backend: &CacheBackend) -> Result<Arc<dyn Cache>, DomainError> {
        match backend {
            CacheBackend::InMemory(config) => {
                Ok(Arc::new(InMemoryCache::with_config(config.clone())))
            }
            CacheBackend::Redis(config) => Ok(Arc::new(RedisCache::new(config.clone()).await?)),
        }
    }
}
