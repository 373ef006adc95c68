//! Catalog service - cache-aside reads over the item store

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::domain::item::{Item, ItemCache, ItemId, ItemRepository, ItemResolver};
use crate::domain::DomainError;
use crate::infrastructure::observability::{record_catalog_cold_start, record_catalog_storage_fetch};

/// Read path for catalog items.
///
/// The cache is consulted first. A cold cache triggers one full storage read
/// that warms it; a partially expired cache triggers a storage read scoped to
/// the missing ids only. Storage errors fail the call, cache problems never do.
#[derive(Debug)]
pub struct CatalogService<C: ItemCache, S: ItemRepository> {
    cache: Arc<C>,
    store: Arc<S>,
}

impl<C: ItemCache, S: ItemRepository> CatalogService<C, S> {
    pub fn new(cache: Arc<C>, store: Arc<S>) -> Self {
        Self { cache, store }
    }

    /// Returns the whole catalog ordered by item id
    #[instrument(skip(self))]
    pub async fn all_items(&self) -> Result<Vec<Item>, DomainError> {
        let known_ids = match self.cache.list_known_ids().await {
            Some(ids) => ids,
            None => return self.load_cold().await,
        };

        if known_ids.is_empty() {
            debug!("Item index present and empty");
            return Ok(Vec::new());
        }

        let mut found = self.cache.fetch_by_ids(&known_ids).await;
        let missing = missing_ids(&known_ids, &found);

        if !missing.is_empty() {
            for item in self.fetch_missing(&missing).await? {
                found.insert(item.id, item);
            }
        }

        Ok(sorted(found))
    }

    /// Returns the items with the given ids that exist, keyed by id.
    ///
    /// Ids absent from both cache and storage are simply missing from the result.
    #[instrument(skip(self, ids), fields(requested = ids.len()))]
    pub async fn items_by_ids(
        &self,
        ids: &[ItemId],
    ) -> Result<HashMap<ItemId, Item>, DomainError> {
        let distinct: Vec<ItemId> = ids
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if distinct.is_empty() {
            return Ok(HashMap::new());
        }

        let mut found = self.cache.fetch_by_ids(&distinct).await;
        let missing = missing_ids(&distinct, &found);

        if missing.is_empty() {
            return Ok(found);
        }

        let fetched = self.store.select_by_ids(&missing).await?;
        record_catalog_storage_fetch("by_ids", fetched.len());

        // Healing a cold index here would make it list a partial catalog
        if !fetched.is_empty() && self.cache.list_known_ids().await.is_some() {
            self.cache.store_items(&fetched).await;
        }

        for item in fetched {
            found.insert(item.id, item);
        }

        Ok(found)
    }

    async fn load_cold(&self) -> Result<Vec<Item>, DomainError> {
        record_catalog_cold_start();

        let mut items = self.store.select_all().await?;
        record_catalog_storage_fetch("all", items.len());
        info!(count = items.len(), "Item index absent, loaded full catalog");

        self.cache.store_items(&items).await;

        items.sort_by_key(|item| item.id);
        Ok(items)
    }

    async fn fetch_missing(&self, missing: &[ItemId]) -> Result<Vec<Item>, DomainError> {
        let fetched = self.store.select_by_ids(missing).await?;
        record_catalog_storage_fetch("by_ids", fetched.len());

        debug!(
            missing = missing.len(),
            fetched = fetched.len(),
            "Refreshed expired item snapshots from storage"
        );

        if !fetched.is_empty() {
            self.cache.store_items(&fetched).await;
        }

        Ok(fetched)
    }
}

#[async_trait]
impl<C: ItemCache, S: ItemRepository> ItemResolver for CatalogService<C, S> {
    async fn resolve(&self, ids: &[ItemId]) -> Result<HashMap<ItemId, Item>, DomainError> {
        self.items_by_ids(ids).await
    }
}

/// Resolves items straight from the item store, bypassing the cache
#[derive(Debug)]
pub struct StoreItemResolver<S: ItemRepository> {
    store: Arc<S>,
}

impl<S: ItemRepository> StoreItemResolver<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: ItemRepository> ItemResolver for StoreItemResolver<S> {
    async fn resolve(&self, ids: &[ItemId]) -> Result<HashMap<ItemId, Item>, DomainError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let items = self.store.select_by_ids(ids).await?;
        Ok(items.into_iter().map(|item| (item.id, item)).collect())
    }
}

fn missing_ids(wanted: &[ItemId], found: &HashMap<ItemId, Item>) -> Vec<ItemId> {
    wanted
        .iter()
        .filter(|id| !found.contains_key(id))
        .copied()
        .collect()
}

fn sorted(items: HashMap<ItemId, Item>) -> Vec<Item> {
    let mut items: Vec<Item> = items.into_values().collect();
    items.sort_by_key(|item| item.id);
    items
}
