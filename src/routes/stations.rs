//! Public charging station routes.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::AdminGate;
use crate::models::pagination::{PagedResult, Pagination};
use crate::models::station::{StationDetail, StationSummary, UpdateStation};
use crate::services::station::{self as station_service, StationFilters};
use crate::AppState;

/// GET /api/admin/stations/public — list stations with lookup names resolved.
pub async fn list(
    State(state): State<AppState>,
    _gate: AdminGate,
    Query(pagination): Query<Pagination>,
    Query(filters): Query<StationFilters>,
) -> Result<Json<ApiResponse<PagedResult<StationSummary>>>, AppError> {
    let result = station_service::list(&state.db, &filters, &pagination).await?;
    Ok(ApiResponse::success(result))
}

/// GET /api/admin/stations/public/{id} — station detail.
pub async fn get_by_id(
    State(state): State<AppState>,
    _gate: AdminGate,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<StationDetail>>, AppError> {
    let result = station_service::find_by_id(&state.db, id).await?;
    Ok(ApiResponse::success(result))
}

/// PATCH /api/admin/stations/public/{id} — update station fields.
pub async fn update(
    State(state): State<AppState>,
    _gate: AdminGate,
    Path(id): Path<i32>,
    Json(body): Json<UpdateStation>,
) -> Result<Json<ApiResponse<StationDetail>>, AppError> {
    let update = body.normalize();
    let result = station_service::update(&state.db, id, &update).await?;
    Ok(ApiResponse::success(result))
}

/// DELETE /api/admin/stations/public/{id}/media — clear the station image and purge
/// its CDN cache entry.
pub async fn delete_image(
    State(state): State<AppState>,
    _gate: AdminGate,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<StationDetail>>, AppError> {
    let result = station_service::clear_image(&state.db, &state.cdn, id).await?;
    Ok(ApiResponse::success(result))
}
