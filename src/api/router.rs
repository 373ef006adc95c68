use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers::{carts, items};
use super::health;
use super::middleware::{logging_middleware, metrics_middleware};
use super::state::AppState;
use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

/// Create the full router with application state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Catalog and carts
        .route("/items", get(items::list_items))
        .route("/carts/{cart_id}", get(carts::get_cart))
        .route("/users/{user_id}/cart", get(carts::get_user_cart))
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Full router plus the Prometheus endpoint, when metrics are enabled
pub fn create_router_with_metrics(
    state: AppState,
    metrics: Option<PrometheusMetrics>,
    metrics_path: &str,
) -> Router {
    let router = create_router(state);

    match metrics {
        Some(m) => router.merge(create_metrics_router(m, metrics_path)),
        None => router,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::cache::{Cache, MockCache};
    use crate::domain::cart::{Cart, CartLine, InMemoryCartRepository};
    use crate::domain::item::{InMemoryItemRepository, Item, MockItemRepository};
    use crate::domain::DomainError;
    use crate::infrastructure::cache::InMemoryCache;
    use crate::infrastructure::item::CacheItemRepository;
    use crate::infrastructure::services::{CartService, CatalogService};

    fn state_with_cache(cache: Arc<dyn Cache>) -> AppState {
        let store = Arc::new(
            InMemoryItemRepository::new()
                .with_item(Item::new(1, "shoe", 100))
                .with_item(Item::new(2, "bag", 300)),
        );
        let carts = Arc::new(
            InMemoryCartRepository::new()
                .with_cart(Cart::new(1, 7))
                .with_line(CartLine::new(10, 1, 1, 2))
                .with_line(CartLine::new(11, 1, 2, 0)),
        );
        let catalog = Arc::new(CatalogService::new(
            Arc::new(CacheItemRepository::new(cache.clone())),
            store,
        ));
        let cart_service = Arc::new(CartService::new(carts.clone(), carts, catalog.clone()));

        AppState::new(catalog, cart_service, cache)
    }

    fn state() -> AppState {
        state_with_cache(Arc::new(InMemoryCache::new()))
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, body)
    }

    #[tokio::test]
    async fn test_list_items() {
        let (status, body) = get_json(create_router(state()), "/items").await;

        assert_eq!(status, StatusCode::OK);
        let items = body.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["id"], 1);
        assert_eq!(items[1]["name"], "bag");
    }

    #[tokio::test]
    async fn test_get_cart_filters_inactive_lines() {
        let (status, body) = get_json(create_router(state()), "/carts/1").await;

        assert_eq!(status, StatusCode::OK);
        let entries = body.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["line_id"], 10);
        assert_eq!(entries[0]["total_price"], 200);
        assert_eq!(entries[0]["item_name"], "shoe");
    }

    #[tokio::test]
    async fn test_unknown_cart_is_empty_not_404() {
        let (status, body) = get_json(create_router(state()), "/carts/404").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::Array(vec![]));
    }

    #[tokio::test]
    async fn test_invalid_cart_id_is_bad_request() {
        let (status, body) = get_json(create_router(state()), "/carts/abc").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["type"], "invalid_request_error");
        assert_eq!(body["error"]["param"], "cart_id");
    }

    #[tokio::test]
    async fn test_user_cart() {
        let (status, body) = get_json(create_router(state()), "/users/7/cart").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (status, body) = get_json(create_router(state()), "/users/8/cart").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::Array(vec![]));
    }

    #[tokio::test]
    async fn test_items_survive_broken_cache() {
        let state = state_with_cache(Arc::new(MockCache::new().with_error("connection refused")));

        let (status, body) = get_json(create_router(state), "/items").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_storage_failure_is_internal_error() {
        let mut store = MockItemRepository::new();
        store
            .expect_select_all()
            .returning(|| Err(DomainError::storage("connection reset")));
        let cache: Arc<dyn Cache> = Arc::new(InMemoryCache::new());
        let catalog = Arc::new(CatalogService::new(
            Arc::new(CacheItemRepository::new(cache.clone())),
            Arc::new(store),
        ));
        let carts = Arc::new(InMemoryCartRepository::new());
        let cart_service = Arc::new(CartService::new(carts.clone(), carts, catalog.clone()));

        let (status, body) = get_json(
            create_router(AppState::new(catalog, cart_service, cache)),
            "/items",
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["type"], "server_error");
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let (status, body) = get_json(create_router(state()), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, _) = get_json(create_router(state()), "/live").await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = get_json(create_router(state()), "/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"][0]["name"], "cache");
    }

    #[tokio::test]
    async fn test_ready_degraded_when_cache_unreachable() {
        let state = state_with_cache(Arc::new(MockCache::new().with_error("connection refused")));

        let (status, body) = get_json(create_router(state), "/ready").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let response = create_router(state())
            .oneshot(
                Request::builder()
                    .uri("/live")
                    .header("x-request-id", "req-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()["x-request-id"], "req-1");
    }
}
