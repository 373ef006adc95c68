//! PostgreSQL item repository implementation

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use tracing::debug;

use crate::domain::item::{Item, ItemId, ItemRepository};
use crate::domain::DomainError;
use crate::infrastructure::storage::{bounded, format_ids};

/// PostgreSQL implementation of ItemRepository
#[derive(Debug, Clone)]
pub struct PostgresItemRepository {
    pool: PgPool,
    query_timeout: Duration,
}

impl PostgresItemRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }
}

#[async_trait]
impl ItemRepository for PostgresItemRepository {
    async fn select_all(&self) -> Result<Vec<Item>, DomainError> {
        let rows = bounded(self.query_timeout, "select all items", async {
            sqlx::query(
                r#"
                SELECT id, name, price, created_at
                FROM items
                ORDER BY id
                "#,
            )
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to select all items: {}", e)))
        })
        .await?;

        debug!(count = rows.len(), "Selected all items");

        rows.iter().map(row_to_item).collect()
    }

    async fn select_by_ids(&self, ids: &[ItemId]) -> Result<Vec<Item>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let raw_ids: Vec<i64> = ids.iter().map(ItemId::value).collect();

        let rows = bounded(self.query_timeout, "select items by ids", async {
            sqlx::query(
                r#"
                SELECT id, name, price, created_at
                FROM items
                WHERE id = ANY($1)
                ORDER BY id
                "#,
            )
            .bind(&raw_ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to select items {}: {}",
                    format_ids(ids),
                    e
                ))
            })
        })
        .await?;

        debug!(
            requested = ids.len(),
            found = rows.len(),
            "Selected items by ids"
        );

        rows.iter().map(row_to_item).collect()
    }
}

fn row_to_item(row: &PgRow) -> Result<Item, DomainError> {
    let decode = |e: sqlx::Error| DomainError::storage(format!("Invalid item row: {}", e));

    let id: i64 = row.try_get("id").map_err(decode)?;
    let name: String = row.try_get("name").map_err(decode)?;
    let price: i64 = row.try_get("price").map_err(decode)?;
    let created_at: chrono::DateTime<chrono::Utc> = row.try_get("created_at").map_err(decode)?;

    Ok(Item::new(id, name, price).with_created_at(created_at))
}
