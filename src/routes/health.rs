//! Health check endpoints for liveness and readiness probes.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::ApiResponse;
use crate::AppState;

/// Readiness probe detail.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub database: String,
    pub cdn: String,
}

/// Connectivity check used by the dashboard on load.
pub async fn ping() -> Json<ApiResponse<&'static str>> {
    ApiResponse::success("pong")
}

/// Liveness probe — always returns OK if the process is running.
pub async fn live() -> &'static str {
    "OK"
}

/// Readiness probe — checks database connectivity and reports CDN
/// configuration.
pub async fn ready(State(state): State<AppState>) -> Json<ApiResponse<HealthStatus>> {
    let db_status = match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => "connected".to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            format!("error: {e}")
        }
    };

    let cdn_status = if state.cdn.is_configured() {
        "configured".to_string()
    } else {
        "not configured".to_string()
    };

    ApiResponse::success(HealthStatus {
        status: "ok".to_string(),
        database: db_status,
        cdn: cdn_status,
    })
}
