//! Platform user routes.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::AdminGate;
use crate::models::pagination::{PagedResult, Pagination};
use crate::models::user::{UpdateUser, UserSummary};
use crate::services::user::{self as user_service, UserDetail, UserFilters};
use crate::AppState;

/// GET /api/admin/users — list users with activity counts.
pub async fn list(
    State(state): State<AppState>,
    _gate: AdminGate,
    Query(pagination): Query<Pagination>,
    Query(filters): Query<UserFilters>,
) -> Result<Json<ApiResponse<PagedResult<UserSummary>>>, AppError> {
    let result = user_service::list(&state.db, &filters, &pagination).await?;
    Ok(ApiResponse::success(result))
}

/// GET /api/admin/users/{id} — profile plus recent listings and bookings.
pub async fn get_by_id(
    State(state): State<AppState>,
    _gate: AdminGate,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<UserDetail>>, AppError> {
    let result = user_service::find_by_id(&state.db, id).await?;
    Ok(ApiResponse::success(result))
}

/// PATCH /api/admin/users/{id} — update account fields.
pub async fn update(
    State(state): State<AppState>,
    _gate: AdminGate,
    Path(id): Path<i32>,
    Json(body): Json<UpdateUser>,
) -> Result<Json<ApiResponse<UserDetail>>, AppError> {
    let result = user_service::update(&state.db, id, &body).await?;
    // Host names/emails appear in the cached metadata payload.
    state.metadata_cache.invalidate().await;
    Ok(ApiResponse::success(result))
}
