//! Cart service - joins cart lines with catalog items

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::domain::cart::{
    CartId, CartLine, CartLineRepository, CartRepository, ResolvedCartEntry, UserId,
};
use crate::domain::item::{ItemId, ItemResolver};
use crate::domain::DomainError;

/// Renders carts from stored lines and resolved items
pub struct CartService<L: CartLineRepository, C: CartRepository> {
    lines: Arc<L>,
    carts: Arc<C>,
    items: Arc<dyn ItemResolver>,
}

impl<L: CartLineRepository, C: CartRepository> std::fmt::Debug for CartService<L, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartService").finish_non_exhaustive()
    }
}

impl<L: CartLineRepository, C: CartRepository> CartService<L, C> {
    pub fn new(lines: Arc<L>, carts: Arc<C>, items: Arc<dyn ItemResolver>) -> Self {
        Self {
            lines,
            carts,
            items,
        }
    }

    /// Returns the visible entries of a cart in line order.
    ///
    /// An unknown cart yields an empty result. Lines whose item no longer
    /// exists are kept without item data. Zero-quantity and soft-deleted
    /// lines are left out.
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    pub async fn resolve_cart(
        &self,
        cart_id: CartId,
    ) -> Result<Vec<ResolvedCartEntry>, DomainError> {
        let lines = match self.lines.select_by_cart_id(cart_id).await {
            Ok(lines) => lines,
            Err(e) if e.is_not_found() => {
                debug!("Cart not found, rendering empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let active: Vec<CartLine> = lines.into_iter().filter(CartLine::is_active).collect();

        if active.is_empty() {
            return Ok(Vec::new());
        }

        let item_ids: Vec<ItemId> = active
            .iter()
            .map(|line| line.item_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let items = self.items.resolve(&item_ids).await?;

        let entries: Vec<ResolvedCartEntry> = active
            .iter()
            .map(|line| ResolvedCartEntry::from_line(line, items.get(&line.item_id)))
            .collect();

        let dangling = entries.iter().filter(|e| e.item.is_none()).count();
        debug!(lines = entries.len(), dangling, "Resolved cart");

        Ok(entries)
    }

    /// Resolves the user's open cart. A user without one gets an empty result.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn resolve_open_cart(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ResolvedCartEntry>, DomainError> {
        match self.carts.find_open_by_user(user_id).await? {
            Some(cart) => self.resolve_cart(cart.id).await,
            None => {
                debug!("User has no open cart");
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::domain::cart::{
        Cart, CartStatus, InMemoryCartRepository, MockCartLineRepository, MockCartRepository,
    };
    use crate::domain::item::{InMemoryItemRepository, Item, MockItemResolver};
    use crate::infrastructure::cache::InMemoryCache;
    use crate::infrastructure::item::CacheItemRepository;
    use crate::infrastructure::services::{CatalogService, StoreItemResolver};

    fn catalog() -> Arc<InMemoryItemRepository> {
        Arc::new(
            InMemoryItemRepository::new()
                .with_item(Item::new(1, "shoe", 100))
                .with_item(Item::new(2, "bag", 300)),
        )
    }

    fn service(
        carts: Arc<InMemoryCartRepository>,
        items: Arc<dyn ItemResolver>,
    ) -> CartService<InMemoryCartRepository, InMemoryCartRepository> {
        CartService::new(carts.clone(), carts, items)
    }

    #[tokio::test]
    async fn test_resolve_cart_joins_items_and_prices() {
        let carts = Arc::new(
            InMemoryCartRepository::new()
                .with_cart(Cart::new(1, 7))
                .with_line(CartLine::new(10, 1, 1, 2))
                .with_line(CartLine::new(11, 1, 2, 1)),
        );
        let service = service(carts, Arc::new(StoreItemResolver::new(catalog())));

        let entries = service.resolve_cart(CartId::new(1)).await.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].item_name.as_deref(), Some("shoe"));
        assert_eq!(entries[0].total_price, Some(200));
        assert_eq!(entries[1].item_name.as_deref(), Some("bag"));
        assert_eq!(entries[1].total_price, Some(300));
        assert!(entries.iter().all(|e| !e.is_deleted));
    }

    #[tokio::test]
    async fn test_unknown_cart_resolves_empty() {
        let carts = Arc::new(InMemoryCartRepository::new());
        let service = service(carts, Arc::new(StoreItemResolver::new(catalog())));

        let entries = service.resolve_cart(CartId::new(99)).await.unwrap();

        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_cart_without_lines_resolves_empty_without_item_lookup() {
        let mut lines = MockCartLineRepository::new();
        lines
            .expect_select_by_cart_id()
            .times(1)
            .returning(|_| Ok(vec![]));
        let mut resolver = MockItemResolver::new();
        resolver.expect_resolve().times(0);

        let service = CartService::new(
            Arc::new(lines),
            Arc::new(MockCartRepository::new()),
            Arc::new(resolver),
        );

        assert!(service.resolve_cart(CartId::new(1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dangling_item_is_kept_without_item_data() {
        let carts = Arc::new(
            InMemoryCartRepository::new()
                .with_cart(Cart::new(1, 7))
                .with_line(CartLine::new(10, 1, 1, 1))
                .with_line(CartLine::new(11, 1, 42, 3)),
        );
        let service = service(carts, Arc::new(StoreItemResolver::new(catalog())));

        let entries = service.resolve_cart(CartId::new(1)).await.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].quantity, 3);
        assert!(entries[1].item.is_none());
        assert!(entries[1].item_name.is_none());
        assert!(entries[1].total_price.is_none());
    }

    #[tokio::test]
    async fn test_zero_quantity_and_deleted_lines_are_filtered() {
        let carts = Arc::new(
            InMemoryCartRepository::new()
                .with_cart(Cart::new(1, 7))
                .with_line(CartLine::new(10, 1, 1, 1))
                .with_line(CartLine::new(11, 1, 2, 0))
                .with_line(CartLine::new(12, 1, 2, 4).deleted()),
        );
        let service = service(carts.clone(), Arc::new(StoreItemResolver::new(catalog())));

        let entries = service.resolve_cart(CartId::new(1)).await.unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].line_id.value(), 10);

        // The raw read still sees every line
        let raw = carts.select_by_cart_id(CartId::new(1)).await.unwrap();
        assert_eq!(raw.len(), 3);
    }

    #[tokio::test]
    async fn test_resolver_receives_distinct_ids() {
        let mut lines = MockCartLineRepository::new();
        lines.expect_select_by_cart_id().returning(|cart_id| {
            Ok(vec![
                CartLine::new(1, cart_id, 5, 1),
                CartLine::new(2, cart_id, 3, 1),
                CartLine::new(3, cart_id, 5, 2),
            ])
        });

        let mut resolver = MockItemResolver::new();
        resolver
            .expect_resolve()
            .withf(|ids| ids.to_vec() == vec![ItemId::new(3), ItemId::new(5)])
            .times(1)
            .returning(|_| Ok(HashMap::from([(ItemId::new(5), Item::new(5, "hat", 50))])));

        let service = CartService::new(
            Arc::new(lines),
            Arc::new(MockCartRepository::new()),
            Arc::new(resolver),
        );

        let entries = service.resolve_cart(CartId::new(1)).await.unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2].total_price, Some(100));
        assert!(entries[1].item.is_none());
    }

    #[tokio::test]
    async fn test_line_store_error_propagates() {
        let mut lines = MockCartLineRepository::new();
        lines
            .expect_select_by_cart_id()
            .returning(|_| Err(DomainError::storage("connection refused")));
        let mut resolver = MockItemResolver::new();
        resolver.expect_resolve().times(0);

        let service = CartService::new(
            Arc::new(lines),
            Arc::new(MockCartRepository::new()),
            Arc::new(resolver),
        );

        let err = service.resolve_cart(CartId::new(1)).await.unwrap_err();
        assert!(matches!(err, DomainError::Storage { .. }));
    }

    #[tokio::test]
    async fn test_item_lookup_error_propagates() {
        let mut lines = MockCartLineRepository::new();
        lines
            .expect_select_by_cart_id()
            .returning(|cart_id| Ok(vec![CartLine::new(1, cart_id, 1, 1)]));
        let mut resolver = MockItemResolver::new();
        resolver
            .expect_resolve()
            .returning(|_| Err(DomainError::storage("timed out")));

        let service = CartService::new(
            Arc::new(lines),
            Arc::new(MockCartRepository::new()),
            Arc::new(resolver),
        );

        assert!(service.resolve_cart(CartId::new(1)).await.is_err());
    }

    #[tokio::test]
    async fn test_resolve_through_catalog_cache() {
        let store = catalog();
        let catalog = Arc::new(CatalogService::new(
            Arc::new(CacheItemRepository::new(Arc::new(InMemoryCache::new()))),
            store.clone(),
        ));
        catalog.all_items().await.unwrap();

        let carts = Arc::new(
            InMemoryCartRepository::new()
                .with_cart(Cart::new(1, 7))
                .with_line(CartLine::new(10, 1, 2, 2)),
        );
        let service = service(carts, catalog);

        let entries = service.resolve_cart(CartId::new(1)).await.unwrap();

        assert_eq!(entries[0].total_price, Some(600));
        assert!(store.select_by_ids_calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_open_cart() {
        let carts = Arc::new(
            InMemoryCartRepository::new()
                .with_cart(Cart::new(1, 7).with_status(CartStatus::Closed))
                .with_cart(Cart::new(2, 7))
                .with_line(CartLine::new(10, 1, 1, 1))
                .with_line(CartLine::new(11, 2, 2, 1)),
        );
        let service = service(carts, Arc::new(StoreItemResolver::new(catalog())));

        let entries = service.resolve_open_cart(UserId::new(7)).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].line_id.value(), 11);

        assert!(service
            .resolve_open_cart(UserId::new(8))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_resolve_open_cart_lookup_error_propagates() {
        let mut carts = MockCartRepository::new();
        carts
            .expect_find_open_by_user()
            .returning(|_| Err(DomainError::storage("connection refused")));
        let mut lines = MockCartLineRepository::new();
        lines.expect_select_by_cart_id().times(0);

        let service = CartService::new(
            Arc::new(lines),
            Arc::new(carts),
            Arc::new(MockItemResolver::new()),
        );

        assert!(service.resolve_open_cart(UserId::new(1)).await.is_err());
    }
}
