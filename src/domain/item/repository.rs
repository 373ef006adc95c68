//! Item repository, cache and resolver traits

use std::collections::HashMap;

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::{Item, ItemId};
use crate::domain::DomainError;

/// Durable source of truth for catalog items
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Loads the full catalog
    async fn select_all(&self) -> Result<Vec<Item>, DomainError>;

    /// Loads the items with the given identifiers. Missing ids are simply absent.
    async fn select_by_ids(&self, ids: &[ItemId]) -> Result<Vec<Item>, DomainError>;
}

/// Best-effort item cache: an index of known ids plus per-item snapshots.
///
/// None of these operations fail. Backend errors and timeouts are folded
/// into misses by the implementation.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ItemCache: Send + Sync {
    /// Returns the known item ids, or `None` when the index itself is absent (cold cache)
    async fn list_known_ids(&self) -> Option<Vec<ItemId>>;

    /// Returns the subset of `ids` with a present, unexpired, well-formed snapshot
    async fn fetch_by_ids(&self, ids: &[ItemId]) -> HashMap<ItemId, Item>;

    /// Writes a snapshot per item and records each id in the index
    async fn store_items(&self, items: &[Item]);
}

/// Identifier-scoped item lookup used by cart aggregation
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ItemResolver: Send + Sync {
    async fn resolve(&self, ids: &[ItemId]) -> Result<HashMap<ItemId, Item>, DomainError>;
}

/// In-memory implementation of ItemRepository
pub mod in_memory {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::RwLock;

    /// In-memory catalog store for testing and development.
    ///
    /// Counts the calls it receives so callers can assert on storage round trips.
    #[derive(Debug, Default)]
    pub struct InMemoryItemRepository {
        items: RwLock<BTreeMap<ItemId, Item>>,
        select_all_calls: AtomicUsize,
        select_by_ids_calls: RwLock<Vec<Vec<ItemId>>>,
    }

    impl InMemoryItemRepository {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_item(mut self, item: Item) -> Self {
            self.items.get_mut().insert(item.id, item);
            self
        }

        pub fn with_items(mut self, items: Vec<Item>) -> Self {
            self.items
                .get_mut()
                .extend(items.into_iter().map(|item| (item.id, item)));
            self
        }

        pub async fn remove(&self, id: ItemId) -> Option<Item> {
            self.items.write().await.remove(&id)
        }

        pub fn select_all_calls(&self) -> usize {
            self.select_all_calls.load(Ordering::SeqCst)
        }

        /// The id lists passed to `select_by_ids`, in call order
        pub async fn select_by_ids_calls(&self) -> Vec<Vec<ItemId>> {
            self.select_by_ids_calls.read().await.clone()
        }
    }

    #[async_trait]
    impl ItemRepository for InMemoryItemRepository {
        async fn select_all(&self) -> Result<Vec<Item>, DomainError> {
            self.select_all_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.items.read().await.values().cloned().collect())
        }

        async fn select_by_ids(&self, ids: &[ItemId]) -> Result<Vec<Item>, DomainError> {
            self.select_by_ids_calls.write().await.push(ids.to_vec());
            let items = self.items.read().await;

            Ok(ids.iter().filter_map(|id| items.get(id).cloned()).collect())
        }
    }
}
