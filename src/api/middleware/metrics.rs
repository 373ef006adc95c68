//! HTTP metrics middleware

use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use metrics::gauge;

use super::logging::matched_path;
use crate::infrastructure::observability::record_http_request;

/// Records count, latency and in-flight requests per route
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = matched_path(&request);

    gauge!("http_requests_in_flight").increment(1.0);
    let response = next.run(request).await;
    gauge!("http_requests_in_flight").decrement(1.0);

    record_http_request(
        method.as_str(),
        &path,
        response.status().as_u16(),
        start.elapsed(),
    );

    response
}
