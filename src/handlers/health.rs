//! Health check handler for monitoring the API status.

use axum::Json;
use serde::Serialize;

/// Public health check response
///
/// Simple status indicator for load balancers and health monitoring.
#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    /// Status indicator (always "ok")
    pub status: String,
}

/// GET /healthz
///
/// Basic liveness probe; requires no authentication and touches no state.
pub async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "ok".to_string(),
    })
}
