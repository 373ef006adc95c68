//! PostgreSQL cart and cart line repository implementations

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use tracing::debug;

use crate::domain::cart::{Cart, CartId, CartLine, CartLineRepository, CartRepository, UserId};
use crate::domain::DomainError;
use crate::infrastructure::storage::bounded;

/// PostgreSQL implementation of CartLineRepository
#[derive(Debug, Clone)]
pub struct PostgresCartLineRepository {
    pool: PgPool,
    query_timeout: Duration,
}

impl PostgresCartLineRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    async fn cart_exists(&self, cart_id: CartId) -> Result<bool, DomainError> {
        bounded(self.query_timeout, "check cart existence", async {
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM carts WHERE id = $1)")
                .bind(cart_id.value())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::storage(format!("Failed to check cart {}: {}", cart_id, e))
                })
        })
        .await
    }
}

#[async_trait]
impl CartLineRepository for PostgresCartLineRepository {
    async fn select_by_cart_id(&self, cart_id: CartId) -> Result<Vec<CartLine>, DomainError> {
        let rows = bounded(self.query_timeout, "select cart lines", async {
            sqlx::query(
                r#"
                SELECT id, cart_id, item_id, quantity, created_at, updated_at, deleted_at
                FROM cart_items
                WHERE cart_id = $1
                ORDER BY id
                "#,
            )
            .bind(cart_id.value())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to select lines of cart {}: {}",
                    cart_id, e
                ))
            })
        })
        .await?;

        if rows.is_empty() && !self.cart_exists(cart_id).await? {
            return Err(DomainError::not_found(format!("Cart {} not found", cart_id)));
        }

        debug!(cart_id = %cart_id, count = rows.len(), "Selected cart lines");

        rows.iter().map(row_to_line).collect()
    }
}

/// PostgreSQL implementation of CartRepository
#[derive(Debug, Clone)]
pub struct PostgresCartRepository {
    pool: PgPool,
    query_timeout: Duration,
}

impl PostgresCartRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }
}

#[async_trait]
impl CartRepository for PostgresCartRepository {
    async fn find_open_by_user(&self, user_id: UserId) -> Result<Option<Cart>, DomainError> {
        let row = bounded(self.query_timeout, "find open cart", async {
            sqlx::query(
                r#"
                SELECT id, user_id, status, created_at
                FROM carts
                WHERE user_id = $1 AND status = 'open'
                ORDER BY id DESC
                LIMIT 1
                "#,
            )
            .bind(user_id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to find open cart of user {}: {}",
                    user_id, e
                ))
            })
        })
        .await?;

        row.as_ref().map(row_to_cart).transpose()
    }
}

fn decode_error(e: sqlx::Error) -> DomainError {
    DomainError::storage(format!("Invalid cart row: {}", e))
}

fn row_to_line(row: &PgRow) -> Result<CartLine, DomainError> {
    let id: i64 = row.try_get("id").map_err(decode_error)?;
    let cart_id: i64 = row.try_get("cart_id").map_err(decode_error)?;
    let item_id: i64 = row.try_get("item_id").map_err(decode_error)?;
    let quantity: i64 = row.try_get("quantity").map_err(decode_error)?;

    let mut line = CartLine::new(id, cart_id, item_id, quantity);
    line.created_at = row.try_get("created_at").map_err(decode_error)?;
    line.updated_at = row.try_get("updated_at").map_err(decode_error)?;
    line.deleted_at = row.try_get("deleted_at").map_err(decode_error)?;

    Ok(line)
}

fn row_to_cart(row: &PgRow) -> Result<Cart, DomainError> {
    let id: i64 = row.try_get("id").map_err(decode_error)?;
    let user_id: i64 = row.try_get("user_id").map_err(decode_error)?;
    let status: String = row.try_get("status").map_err(decode_error)?;

    let mut cart = Cart::new(id, user_id).with_status(
        status
            .parse()
            .map_err(|e| DomainError::storage(format!("Invalid cart status in database: {}", e)))?,
    );
    cart.created_at = row.try_get("created_at").map_err(decode_error)?;

    Ok(cart)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance"]
    async fn test_unknown_cart_is_not_found() {
        let url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/shopping_cart_test".to_string());
        let pool = PgPoolOptions::new().connect(&url).await.unwrap();
        let repo = PostgresCartLineRepository::new(pool, Duration::from_secs(5));

        let err = repo
            .select_by_cart_id(CartId::new(i64::MAX))
            .await
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_unreachable_database_is_storage_error() {
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(100))
            .connect_lazy("postgres://127.0.0.1:1/shopping_cart")
            .unwrap();
        let repo = PostgresCartRepository::new(pool, Duration::from_secs(2));

        let err = repo.find_open_by_user(UserId::new(1)).await.unwrap_err();

        assert!(matches!(err, DomainError::Storage { .. }));
    }
}
