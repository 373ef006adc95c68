//! Item cache backed by the generic key-value cache
//!
//! Layout:
//! - `item:all:ids` holds the set of known item ids. It always contains
//!   [`INDEX_SENTINEL`] once written, so an empty catalog is still a present index.
//! - `item:{id}` holds a JSON snapshot of one item with its own expiry.
//!
//! Writes go snapshots first, index second.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, warn};

use crate::domain::cache::{Cache, CacheExt};
use crate::domain::item::{Item, ItemCache, ItemId};
use crate::domain::DomainError;
use crate::infrastructure::observability::record_item_cache_lookup;

/// Key of the index set of all known item ids
pub const ITEM_INDEX_KEY: &str = "item:all:ids";

/// Reserved index member marking the index as present
pub const INDEX_SENTINEL: &str = "-";

/// Default lifetime of an item snapshot
pub const DEFAULT_ITEM_TTL: Duration = Duration::from_secs(30 * 60);

/// Cache key of an item snapshot
pub fn item_key(id: ItemId) -> String {
    format!("item:{}", id)
}

/// Configuration for the item cache
#[derive(Debug, Clone)]
pub struct ItemCacheConfig {
    /// Lifetime of each item snapshot
    pub item_ttl: Duration,
    /// Deadline for a single cache call; an elapsed call counts as a miss
    pub operation_timeout: Duration,
}

impl Default for ItemCacheConfig {
    fn default() -> Self {
        Self {
            item_ttl: DEFAULT_ITEM_TTL,
            operation_timeout: Duration::from_millis(500),
        }
    }
}

impl ItemCacheConfig {
    pub fn with_item_ttl(mut self, ttl: Duration) -> Self {
        self.item_ttl = ttl;
        self
    }

    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }
}

/// Best-effort [`ItemCache`] over any [`Cache`] backend
#[derive(Debug, Clone)]
pub struct CacheItemRepository {
    cache: Arc<dyn Cache>,
    config: ItemCacheConfig,
}

impl CacheItemRepository {
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self::with_config(cache, ItemCacheConfig::default())
    }

    pub fn with_config(cache: Arc<dyn Cache>, config: ItemCacheConfig) -> Self {
        Self { cache, config }
    }

    /// Runs a cache call under the operation deadline, folding failures into `None`
    async fn guarded<T, F>(&self, operation: &str, key: &str, call: F) -> Option<T>
    where
        F: Future<Output = Result<T, DomainError>>,
    {
        match tokio::time::timeout(self.config.operation_timeout, call).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                warn!(operation, key, error = %e, "Item cache call failed, treating as miss");
                None
            }
            Err(_) => {
                warn!(
                    operation,
                    key,
                    timeout_ms = self.config.operation_timeout.as_millis() as u64,
                    "Item cache call timed out, treating as miss"
                );
                None
            }
        }
    }

    async fn fetch_one(&self, id: ItemId) -> Option<Item> {
        let key = item_key(id);
        let item: Item = self
            .guarded("get", &key, self.cache.get(&key))
            .await
            .flatten()?;

        if item.id != id {
            warn!(key = %key, found_id = %item.id, "Cached item snapshot has a mismatched id, skipping");
            return None;
        }

        Some(item)
    }

    async fn store_one(&self, item: &Item) -> bool {
        let key = item_key(item.id);

        self.guarded(
            "set",
            &key,
            self.cache.set(&key, item, self.config.item_ttl),
        )
        .await
        .is_some()
    }
}

#[async_trait]
impl ItemCache for CacheItemRepository {
    async fn list_known_ids(&self) -> Option<Vec<ItemId>> {
        let members = self
            .guarded(
                "set_members",
                ITEM_INDEX_KEY,
                self.cache.set_members(ITEM_INDEX_KEY),
            )
            .await
            .flatten()?;

        let mut ids = Vec::with_capacity(members.len());

        for member in members {
            if member == INDEX_SENTINEL {
                continue;
            }

            match member.parse::<ItemId>() {
                Ok(id) => ids.push(id),
                Err(e) => {
                    warn!(member = %member, error = %e, "Invalid item id in cache index, skipping");
                }
            }
        }

        ids.sort();
        ids.dedup();
        Some(ids)
    }

    async fn fetch_by_ids(&self, ids: &[ItemId]) -> HashMap<ItemId, Item> {
        let fetched = join_all(ids.iter().map(|id| self.fetch_one(*id))).await;

        let result: HashMap<ItemId, Item> = fetched
            .into_iter()
            .flatten()
            .map(|item| (item.id, item))
            .collect();

        record_item_cache_lookup(result.len(), ids.len().saturating_sub(result.len()));
        debug!(
            requested = ids.len(),
            hits = result.len(),
            "Fetched item snapshots from cache"
        );

        result
    }

    async fn store_items(&self, items: &[Item]) {
        let stored = join_all(items.iter().map(|item| self.store_one(item)))
            .await
            .into_iter()
            .filter(|stored| *stored)
            .count();

        // Index last, in one call: a present index never precedes its snapshots.
        // Ids whose snapshot write failed are still indexed and read back as misses.
        let mut members: Vec<String> = items.iter().map(|item| item.id.to_string()).collect();
        members.push(INDEX_SENTINEL.to_string());

        self.guarded(
            "set_add",
            ITEM_INDEX_KEY,
            self.cache.set_add(ITEM_INDEX_KEY, &members),
        )
        .await;

        debug!(count = items.len(), stored, "Stored item snapshots in cache");
    }
}
