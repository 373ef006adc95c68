//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, CartItemSource, CatalogConfig, DatabaseConfig, ItemCacheSettings, LogFormat,
    LoggingConfig, ServerConfig,
};
