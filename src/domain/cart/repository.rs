//! Cart repository traits

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::{Cart, CartId, CartLine, UserId};
use crate::domain::DomainError;

/// Durable store of cart-to-item associations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CartLineRepository: Send + Sync {
    /// Returns every stored line of the cart, soft-deleted ones included.
    ///
    /// Fails with `DomainError::NotFound` when the cart itself does not exist.
    async fn select_by_cart_id(&self, cart_id: CartId) -> Result<Vec<CartLine>, DomainError>;
}

/// Read access to carts
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Finds the open cart owned by the user, if any
    async fn find_open_by_user(&self, user_id: UserId) -> Result<Option<Cart>, DomainError>;
}

/// In-memory implementations of the cart repositories
pub mod in_memory {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::RwLock;

    /// In-memory cart store for testing and development
    #[derive(Debug, Default)]
    pub struct InMemoryCartRepository {
        carts: RwLock<BTreeMap<CartId, Cart>>,
        lines: RwLock<BTreeMap<i64, CartLine>>,
        line_selects: AtomicUsize,
    }

    impl InMemoryCartRepository {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_cart(mut self, cart: Cart) -> Self {
            self.carts.get_mut().insert(cart.id, cart);
            self
        }

        pub fn with_line(mut self, line: CartLine) -> Self {
            self.lines.get_mut().insert(line.id.value(), line);
            self
        }

        /// Number of `select_by_cart_id` calls received
        pub fn line_selects(&self) -> usize {
            self.line_selects.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CartLineRepository for InMemoryCartRepository {
        async fn select_by_cart_id(&self, cart_id: CartId) -> Result<Vec<CartLine>, DomainError> {
            self.line_selects.fetch_add(1, Ordering::SeqCst);

            if !self.carts.read().await.contains_key(&cart_id) {
                return Err(DomainError::not_found(format!(
                    "Cart '{}' not found",
                    cart_id
                )));
            }

            Ok(self
                .lines
                .read()
                .await
                .values()
                .filter(|line| line.cart_id == cart_id)
                .cloned()
                .collect())
        }
    }

    #[async_trait]
    impl CartRepository for InMemoryCartRepository {
        async fn find_open_by_user(&self, user_id: UserId) -> Result<Option<Cart>, DomainError> {
            Ok(self
                .carts
                .read()
                .await
                .values()
                .find(|cart| cart.user_id == user_id && cart.is_open())
                .cloned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::in_memory::InMemoryCartRepository;
    use super::*;
    use crate::domain::cart::CartStatus;

    #[tokio::test]
    async fn test_in_memory_lines_include_soft_deleted() {
        let repo = InMemoryCartRepository::new()
            .with_cart(Cart::new(1, 5))
            .with_line(CartLine::new(1, 1, 1, 2))
            .with_line(CartLine::new(2, 1, 2, 1).deleted())
            .with_line(CartLine::new(3, 2, 1, 1));

        let lines = repo.select_by_cart_id(CartId::new(1)).await.unwrap();

        assert_eq!(lines.len(), 2);
        assert!(lines[1].is_deleted());
        assert_eq!(repo.line_selects(), 1);
    }

    #[tokio::test]
    async fn test_in_memory_unknown_cart_is_not_found() {
        let repo = InMemoryCartRepository::new();

        let err = repo.select_by_cart_id(CartId::new(3)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_in_memory_find_open_by_user_skips_closed() {
        let repo = InMemoryCartRepository::new()
            .with_cart(Cart::new(1, 5).with_status(CartStatus::Closed))
            .with_cart(Cart::new(2, 5));

        let cart = repo.find_open_by_user(UserId::new(5)).await.unwrap().unwrap();
        assert_eq!(cart.id, CartId::new(2));

        assert!(repo.find_open_by_user(UserId::new(6)).await.unwrap().is_none());
    }
}
