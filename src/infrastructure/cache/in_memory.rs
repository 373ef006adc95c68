//! In-memory cache implementation using moka

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache as MokaCache;

use crate::domain::cache::Cache;
use crate::domain::DomainError;

/// Configuration for in-memory cache
#[derive(Debug, Clone)]
pub struct InMemoryCacheConfig {
    /// Maximum number of entries
    pub max_capacity: u64,
    /// Upper bound on any entry's lifetime
    pub default_ttl: Duration,
}

impl Default for InMemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            default_ttl: Duration::from_secs(3600), // 1 hour
        }
    }
}

impl InMemoryCacheConfig {
    /// Creates a new configuration with specified max capacity
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }

    /// Sets the default TTL
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }
}

/// Cache entry stored in moka
#[derive(Debug, Clone)]
struct CacheEntry {
    /// Serialized JSON value
    data: String,
    /// Expiration timestamp (millis since epoch)
    expires_at: u64,
}

/// Thread-safe in-memory cache implementation using moka
///
/// Features:
/// - TTL support per entry
/// - LRU-like eviction when capacity is reached
/// - String sets kept outside moka; they never expire or get evicted
#[derive(Debug)]
pub struct InMemoryCache {
    cache: MokaCache<String, CacheEntry>,
    sets: Mutex<HashMap<String, BTreeSet<String>>>,
}

impl InMemoryCache {
    /// Creates a new in-memory cache with default configuration
    pub fn new() -> Self {
        Self::with_config(InMemoryCacheConfig::default())
    }

    /// Creates a new in-memory cache with the given configuration
    pub fn with_config(config: InMemoryCacheConfig) -> Self {
        let cache = MokaCache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.default_ttl)
            .build();

        Self {
            cache,
            sets: Mutex::new(HashMap::new()),
        }
    }

    fn current_time_millis() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }

    fn is_expired(entry: &CacheEntry) -> bool {
        Self::current_time_millis() > entry.expires_at
    }

    fn lock_sets(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, BTreeSet<String>>>, DomainError> {
        self.sets
            .lock()
            .map_err(|_| DomainError::cache("In-memory set storage is poisoned"))
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
        match self.cache.get(key).await {
            Some(entry) => {
                if Self::is_expired(&entry) {
                    self.cache.remove(key).await;
                    return Ok(None);
                }

                Ok(Some(entry.data.clone()))
            }
            None => Ok(None),
        }
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        let expires_at = Self::current_time_millis() + ttl.as_millis() as u64;
        let entry = CacheEntry {
            data: value.to_string(),
            expires_at,
        };

        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        let existed = self.cache.remove(key).await.is_some();
        let removed_set = self.lock_sets()?.remove(key).is_some();
        Ok(existed || removed_set)
    }

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        if self.lock_sets()?.contains_key(key) {
            return Ok(true);
        }

        Ok(self.get_raw(key).await?.is_some())
    }

    async fn set_add(&self, key: &str, members: &[String]) -> Result<usize, DomainError> {
        let mut sets = self.lock_sets()?;
        let set = sets.entry(key.to_string()).or_default();
        let mut added = 0;

        for member in members {
            if set.insert(member.clone()) {
                added += 1;
            }
        }

        Ok(added)
    }

    async fn set_members(&self, key: &str) -> Result<Option<Vec<String>>, DomainError> {
        Ok(self
            .lock_sets()?
            .get(key)
            .map(|set| set.iter().cloned().collect()))
    }
}
