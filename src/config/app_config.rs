use std::time::Duration;

use serde::Deserialize;

use crate::domain::DomainError;
use crate::infrastructure::cache::{CacheBackend, InMemoryCacheConfig, RedisCacheConfig};
use crate::infrastructure::item::{ItemCacheConfig, DEFAULT_ITEM_TTL};
use crate::infrastructure::observability::MetricsConfig;
use crate::infrastructure::storage::PostgresConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub database: DatabaseConfig,
    pub cache: ItemCacheSettings,
    pub catalog: CatalogConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

/// Item store selection. Without a URL the catalog and carts live in memory.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub query_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ItemCacheSettings {
    /// "in_memory" or "redis"
    pub backend: String,
    pub redis_url: Option<String>,
    pub key_prefix: Option<String>,
    pub item_ttl_secs: u64,
    pub operation_timeout_ms: u64,
    pub connection_timeout_ms: u64,
    pub max_capacity: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub cart_item_source: CartItemSource,
}

/// Where cart rendering looks up items
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CartItemSource {
    /// Through the catalog cache, falling back to storage for misses
    #[default]
    Cache,
    /// Straight from storage
    Storage,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        let defaults = PostgresConfig::default();

        Self {
            url: None,
            max_connections: defaults.max_connections,
            min_connections: defaults.min_connections,
            connect_timeout_secs: defaults.connect_timeout_secs,
            idle_timeout_secs: defaults.idle_timeout_secs,
            query_timeout_ms: defaults.query_timeout_ms,
        }
    }
}

impl DatabaseConfig {
    /// PostgreSQL settings, if a database is configured
    pub fn postgres(&self) -> Option<PostgresConfig> {
        self.url.as_ref().map(|url| {
            PostgresConfig::new(url.clone())
                .with_max_connections(self.max_connections)
                .with_min_connections(self.min_connections)
                .with_connect_timeout(self.connect_timeout_secs)
                .with_idle_timeout(self.idle_timeout_secs)
                .with_query_timeout(self.query_timeout_ms)
        })
    }
}

impl Default for ItemCacheSettings {
    fn default() -> Self {
        Self {
            backend: "in_memory".to_string(),
            redis_url: None,
            key_prefix: None,
            item_ttl_secs: DEFAULT_ITEM_TTL.as_secs(),
            operation_timeout_ms: 500,
            connection_timeout_ms: 5_000,
            max_capacity: 10_000,
        }
    }
}

impl ItemCacheSettings {
    /// Backend selection for the cache factory
    pub fn backend(&self) -> Result<CacheBackend, DomainError> {
        match self.backend.to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(CacheBackend::InMemory(
                InMemoryCacheConfig::default()
                    .with_max_capacity(self.max_capacity)
                    .with_default_ttl(self.item_ttl()),
            )),
            "redis" => {
                let url = self.redis_url.clone().ok_or_else(|| {
                    DomainError::configuration("cache.redis_url is required for the redis backend")
                })?;

                let mut config = RedisCacheConfig::new(url)
                    .with_connection_timeout(Duration::from_millis(self.connection_timeout_ms));

                if let Some(prefix) = &self.key_prefix {
                    config = config.with_key_prefix(prefix.clone());
                }

                Ok(CacheBackend::Redis(config))
            }
            other => Err(DomainError::configuration(format!(
                "Unknown cache backend: {}. Valid backends: in_memory, redis",
                other
            ))),
        }
    }

    /// Settings for the item cache layered on the backend
    pub fn items(&self) -> ItemCacheConfig {
        ItemCacheConfig::default()
            .with_item_ttl(self.item_ttl())
            .with_operation_timeout(Duration::from_millis(self.operation_timeout_ms))
    }

    fn item_ttl(&self) -> Duration {
        Duration::from_secs(self.item_ttl_secs)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
