//! Health check endpoints for Kubernetes probes

use std::time::{Duration, Instant};

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use super::state::AppState;

const PROBE_TIMEOUT: Duration = Duration::from_secs(2);
const PROBE_KEY: &str = "health:probe";

/// Detailed health response with component status
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<HealthCheck>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

/// Health check status
#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Individual component health check
#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

impl HealthCheck {
    fn from_probe(
        name: &str,
        failure_status: HealthStatus,
        outcome: Result<(), String>,
        start: Instant,
    ) -> Self {
        let (status, message) = match outcome {
            Ok(()) => (HealthStatus::Healthy, None),
            Err(message) => (failure_status, Some(message)),
        };

        Self {
            name: name.to_string(),
            status,
            message,
            latency_ms: Some(start.elapsed().as_millis() as u64),
        }
    }
}

/// Simple health check - returns 200 if the service is running
pub async fn health_check() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: None,
        latency_ms: None,
    };

    (StatusCode::OK, Json(response))
}

/// Readiness check with dependency verification.
///
/// An unreachable cache only degrades the service; reads fall back to storage.
/// An unreachable database makes it unready.
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let mut checks = vec![check_cache(&state).await];

    if state.database.is_some() {
        checks.push(check_database(&state).await);
    }

    let overall_status = checks
        .iter()
        .map(|check| check.status)
        .fold(HealthStatus::Healthy, worst);

    let response = HealthResponse {
        status: overall_status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: Some(checks),
        latency_ms: Some(start.elapsed().as_millis() as u64),
    };

    let status_code = match overall_status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(response))
}

/// Liveness check - simple check to verify the service is running
pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}

fn worst(a: HealthStatus, b: HealthStatus) -> HealthStatus {
    use HealthStatus::*;

    match (a, b) {
        (Unhealthy, _) | (_, Unhealthy) => Unhealthy,
        (Degraded, _) | (_, Degraded) => Degraded,
        _ => Healthy,
    }
}

async fn check_cache(state: &AppState) -> HealthCheck {
    let start = Instant::now();

    let outcome = match tokio::time::timeout(PROBE_TIMEOUT, state.cache.exists(PROBE_KEY)).await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err("cache probe timed out".to_string()),
    };

    HealthCheck::from_probe("cache", HealthStatus::Degraded, outcome, start)
}

async fn check_database(state: &AppState) -> HealthCheck {
    let start = Instant::now();

    let outcome = match &state.database {
        Some(pool) => {
            let ping = sqlx::query("SELECT 1").execute(pool);

            match tokio::time::timeout(PROBE_TIMEOUT, ping).await {
                Ok(Ok(_)) => Ok(()),
                Ok(Err(e)) => Err(e.to_string()),
                Err(_) => Err("database probe timed out".to_string()),
            }
        }
        None => Ok(()),
    };

    HealthCheck::from_probe("database", HealthStatus::Unhealthy, outcome, start)
}
