//! PostgreSQL connection pooling and query guards

use std::future::Future;
use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::domain::DomainError;

/// PostgreSQL storage configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to maintain
    pub min_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Idle timeout in seconds
    pub idle_timeout_secs: u64,
    /// Upper bound on a single query, in milliseconds
    pub query_timeout_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/shopping_cart".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
            query_timeout_ms: 5_000,
        }
    }
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    pub fn with_idle_timeout(mut self, secs: u64) -> Self {
        self.idle_timeout_secs = secs;
        self
    }

    pub fn with_query_timeout(mut self, millis: u64) -> Self {
        self.query_timeout_ms = millis;
        self
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

/// Opens a connection pool for the configured database
pub async fn connect(config: &PostgresConfig) -> Result<PgPool, DomainError> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect(&config.url)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))
}

/// Runs a query under a deadline. An elapsed deadline is a storage failure.
pub async fn bounded<T, F>(timeout: Duration, operation: &str, query: F) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, DomainError>>,
{
    tokio::time::timeout(timeout, query).await.map_err(|_| {
        DomainError::storage(format!("{} timed out after {:?}", operation, timeout))
    })?
}

/// Formats identifiers for error context
pub(crate) fn format_ids<T: std::fmt::Display>(ids: &[T]) -> String {
    let joined = ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{}]", joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_config_default() {
        let config = PostgresConfig::default();

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.connect_timeout_secs, 30);
        assert_eq!(config.idle_timeout_secs, 600);
        assert_eq!(config.query_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_postgres_config_builder() {
        let config = PostgresConfig::new("postgres://localhost/test")
            .with_max_connections(20)
            .with_min_connections(5)
            .with_connect_timeout(60)
            .with_idle_timeout(300)
            .with_query_timeout(250);

        assert_eq!(config.url, "postgres://localhost/test");
        assert_eq!(config.max_connections, 20);
        assert_eq!(config.min_connections, 5);
        assert_eq!(config.connect_timeout_secs, 60);
        assert_eq!(config.idle_timeout_secs, 300);
        assert_eq!(config.query_timeout_ms, 250);
    }

    #[tokio::test]
    async fn test_bounded_times_out_as_storage_error() {
        let result: Result<(), DomainError> = bounded(
            Duration::from_millis(10),
            "select items",
            async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(())
            },
        )
        .await;

        let err = result.unwrap_err();
        assert!(matches!(err, DomainError::Storage { .. }));
        assert!(err.to_string().contains("select items timed out"));
    }

    #[tokio::test]
    async fn test_bounded_passes_through_result() {
        let result = bounded(Duration::from_secs(1), "select items", async { Ok(3) }).await;
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn test_format_ids() {
        assert_eq!(format_ids(&[1, 2, 3]), "[1, 2, 3]");
        assert_eq!(format_ids::<i64>(&[]), "[]");
    }
}
