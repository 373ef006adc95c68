//! Application state for shared services

use std::sync::Arc;

use sqlx::PgPool;

use crate::domain::cache::Cache;
use crate::domain::cart::{CartId, CartLineRepository, CartRepository, ResolvedCartEntry, UserId};
use crate::domain::item::{Item, ItemCache, ItemRepository};
use crate::domain::DomainError;
use crate::infrastructure::services::{CartService, CatalogService};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub catalog_service: Arc<dyn CatalogServiceTrait>,
    pub cart_service: Arc<dyn CartServiceTrait>,
    /// Cache backend, probed by the readiness check
    pub cache: Arc<dyn Cache>,
    /// Database pool, absent when running on in-memory stores
    pub database: Option<PgPool>,
}

impl AppState {
    pub fn new(
        catalog_service: Arc<dyn CatalogServiceTrait>,
        cart_service: Arc<dyn CartServiceTrait>,
        cache: Arc<dyn Cache>,
    ) -> Self {
        Self {
            catalog_service,
            cart_service,
            cache,
            database: None,
        }
    }

    pub fn with_database(mut self, pool: PgPool) -> Self {
        self.database = Some(pool);
        self
    }
}

/// Trait for catalog read operations
#[async_trait::async_trait]
pub trait CatalogServiceTrait: Send + Sync {
    async fn all_items(&self) -> Result<Vec<Item>, DomainError>;
}

/// Trait for cart read operations
#[async_trait::async_trait]
pub trait CartServiceTrait: Send + Sync {
    async fn resolve_cart(&self, cart_id: CartId) -> Result<Vec<ResolvedCartEntry>, DomainError>;
    async fn resolve_open_cart(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ResolvedCartEntry>, DomainError>;
}

#[async_trait::async_trait]
impl<C: ItemCache + 'static, S: ItemRepository + 'static> CatalogServiceTrait
    for CatalogService<C, S>
{
    async fn all_items(&self) -> Result<Vec<Item>, DomainError> {
        CatalogService::all_items(self).await
    }
}

#[async_trait::async_trait]
impl<L: CartLineRepository + 'static, C: CartRepository + 'static> CartServiceTrait
    for CartService<L, C>
{
    async fn resolve_cart(&self, cart_id: CartId) -> Result<Vec<ResolvedCartEntry>, DomainError> {
        CartService::resolve_cart(self, cart_id).await
    }

    async fn resolve_open_cart(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ResolvedCartEntry>, DomainError> {
        CartService::resolve_open_cart(self, user_id).await
    }
}
