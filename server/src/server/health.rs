//! Health, readiness and metrics endpoints.

use super::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use helpdesk_web::AppError;
use serde::Serialize;

/// Liveness message at `/`.
pub async fn root() -> &'static str {
    "Helpdesk API is running"
}

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
}

/// Health check endpoint.
///
/// Returns 200 OK if the process is running. Dependencies are not checked.
///
/// ```bash
/// curl http://localhost:3001/health
/// # {"status":"ok","version":"0.1.0"}
/// ```
pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Readiness check response.
#[derive(Serialize)]
pub struct ReadinessResponse {
    /// Overall readiness status
    pub ready: bool,
    /// Database connectivity
    pub database: bool,
}

/// Readiness check endpoint.
///
/// Returns 503 when the database does not answer.
///
/// ```bash
/// curl http://localhost:3001/ready
/// # {"ready":true,"database":true}
/// ```
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let database = state.is_ready().await;
    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ReadinessResponse {
            ready: database,
            database,
        }),
    )
}

/// Prometheus text exposition.
///
/// # Errors
///
/// 404 when metrics are disabled.
pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, AppError> {
    state
        .metrics
        .as_ref()
        .map(metrics_exporter_prometheus::PrometheusHandle::render)
        .ok_or_else(AppError::route_not_found)
}

/// Fallback for unknown routes.
pub async fn not_found() -> AppError {
    AppError::route_not_found()
}
