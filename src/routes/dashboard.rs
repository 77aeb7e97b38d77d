//! Admin dashboard route.

use axum::{extract::State, Json};

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::AdminGate;
use crate::services::dashboard::{self as dashboard_service, DashboardStats};
use crate::AppState;

/// GET /api/admin/dashboard — aggregated platform statistics.
pub async fn get_stats(
    State(state): State<AppState>,
    _gate: AdminGate,
) -> Result<Json<ApiResponse<DashboardStats>>, AppError> {
    let result = dashboard_service::get_stats(&state.db).await?;
    Ok(ApiResponse::success(result))
}
