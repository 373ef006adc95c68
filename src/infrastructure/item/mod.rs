//! Item infrastructure - Cache-backed and PostgreSQL item stores

mod cache_repository;
mod postgres_repository;

pub use cache_repository::{
    item_key, CacheItemRepository, ItemCacheConfig, DEFAULT_ITEM_TTL, INDEX_SENTINEL,
    ITEM_INDEX_KEY,
};
pub use postgres_repository::PostgresItemRepository;
