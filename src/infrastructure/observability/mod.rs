//! Observability infrastructure - Prometheus metrics

mod config;
mod metrics;

pub use self::config::MetricsConfig;
pub use self::metrics::{
    create_metrics_router, init_metrics, record_catalog_cold_start, record_catalog_storage_fetch,
    record_http_request, record_item_cache_lookup, PrometheusMetrics,
};
