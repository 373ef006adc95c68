//! Shopping Cart Manager
//!
//! Backend core of a shopping cart service:
//! - Catalog reads through a best-effort item cache (in-memory or Redis)
//! - Cart rendering that joins stored lines with catalog items
//! - PostgreSQL or in-memory stores behind repository traits

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use crate::config::AppConfig;

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::state::AppState;
use crate::config::CartItemSource;
use crate::domain::cart::InMemoryCartRepository;
use crate::domain::item::InMemoryItemRepository;
use crate::domain::{Cache, CartLineRepository, CartRepository, ItemRepository, ItemResolver};
use crate::infrastructure::{
    cache::CacheFactory,
    cart::{PostgresCartLineRepository, PostgresCartRepository},
    item::{CacheItemRepository, PostgresItemRepository},
    services::{CartService, CatalogService, StoreItemResolver},
    storage,
};

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let backend = config.cache.backend()?;
    info!(backend = %backend, "Initializing item cache");
    let cache = CacheFactory::new().create(&backend).await?;

    match config.database.postgres() {
        Some(postgres) => {
            info!("Connecting to PostgreSQL");
            let pool = storage::connect(&postgres).await?;
            let timeout = postgres.query_timeout();

            let state = build_state(
                config,
                cache,
                Arc::new(PostgresItemRepository::new(pool.clone(), timeout)),
                Arc::new(PostgresCartLineRepository::new(pool.clone(), timeout)),
                Arc::new(PostgresCartRepository::new(pool.clone(), timeout)),
            );

            Ok(state.with_database(pool))
        }
        None => {
            warn!("No database configured, using empty in-memory stores");
            let carts = Arc::new(InMemoryCartRepository::new());

            Ok(build_state(
                config,
                cache,
                Arc::new(InMemoryItemRepository::new()),
                carts.clone(),
                carts,
            ))
        }
    }
}

fn build_state<S, L, C>(
    config: &AppConfig,
    cache: Arc<dyn Cache>,
    store: Arc<S>,
    lines: Arc<L>,
    carts: Arc<C>,
) -> AppState
where
    S: ItemRepository + 'static,
    L: CartLineRepository + 'static,
    C: CartRepository + 'static,
{
    let item_cache = Arc::new(CacheItemRepository::with_config(
        cache.clone(),
        config.cache.items(),
    ));
    let catalog = Arc::new(CatalogService::new(item_cache, store.clone()));

    let resolver: Arc<dyn ItemResolver> = match config.catalog.cart_item_source {
        CartItemSource::Cache => catalog.clone(),
        CartItemSource::Storage => Arc::new(StoreItemResolver::new(store)),
    };
    info!(source = ?config.catalog.cart_item_source, "Cart items resolved");

    let cart_service = Arc::new(CartService::new(lines, carts, resolver));

    AppState::new(catalog, cart_service, cache)
}
