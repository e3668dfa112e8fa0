use axum::{extract::State, response::Json};

use crate::runtime::{HttpVaultRuntime, types::HealthResponse};

/// GET /health - liveness probe
pub async fn health_check(State(runtime): State<HttpVaultRuntime>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "tabvault".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        uptime_seconds: runtime.started_at.elapsed().as_secs(),
    })
}
