//! Booking routes: list, statistics, detail, and admin updates.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::AdminGate;
use crate::models::booking::{BookingDetail, BookingSummary, FieldChange, UpdateBooking};
use crate::models::pagination::{PagedResult, Pagination};
use crate::services::analytics::{self, BookingStats, DateRange};
use crate::services::booking::{self as booking_service, BookingFilters};
use crate::AppState;

/// GET /api/admin/bookings — list bookings with filters and pagination.
pub async fn list(
    State(state): State<AppState>,
    _gate: AdminGate,
    Query(pagination): Query<Pagination>,
    Query(filters): Query<BookingFilters>,
) -> Result<Json<ApiResponse<PagedResult<BookingSummary>>>, AppError> {
    let result = booking_service::list(&state.db, &filters, &pagination).await?;
    Ok(ApiResponse::success(result))
}

/// GET /api/admin/bookings/stats — aggregated booking statistics.
pub async fn stats(
    State(state): State<AppState>,
    _gate: AdminGate,
    Query(range): Query<DateRange>,
) -> Result<Json<ApiResponse<BookingStats>>, AppError> {
    let result = analytics::booking_stats(&state.db, &range).await?;
    Ok(ApiResponse::success(result))
}

/// GET /api/admin/bookings/{id} — deep booking detail.
pub async fn get_by_id(
    State(state): State<AppState>,
    _gate: AdminGate,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<BookingDetail>>, AppError> {
    let result = booking_service::find_by_id(&state.db, &id).await?;
    Ok(ApiResponse::success(result))
}

/// Update response carrying the new state and what changed.
#[derive(Debug, Serialize)]
pub struct BookingUpdated {
    pub booking: BookingDetail,
    pub changes: Vec<FieldChange>,
}

/// PATCH /api/admin/bookings/{id} — update status and/or payment status.
pub async fn update(
    State(state): State<AppState>,
    _gate: AdminGate,
    Path(id): Path<String>,
    Json(body): Json<UpdateBooking>,
) -> Result<Json<ApiResponse<BookingUpdated>>, AppError> {
    let (booking, changes) = booking_service::update(&state.db, &id, &body).await?;
    Ok(ApiResponse::success(BookingUpdated { booking, changes }))
}
