//! Private charger routes: list, detail, updates, and media management.

use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::AdminGate;
use crate::models::charger::{
    ChargerDetail, ChargerSummary, UpdateChargerRequest, UpdateChargerStatus,
};
use crate::models::pagination::{PagedResult, Pagination};
use crate::services::charger::{self as charger_service, ChargerFilters, MediaUploaded};
use crate::AppState;

/// GET /api/admin/stations/private — list charger listings.
pub async fn list(
    State(state): State<AppState>,
    _gate: AdminGate,
    Query(pagination): Query<Pagination>,
    Query(filters): Query<ChargerFilters>,
) -> Result<Json<ApiResponse<PagedResult<ChargerSummary>>>, AppError> {
    let result = charger_service::list(&state.db, &filters, &pagination).await?;
    Ok(ApiResponse::success(result))
}

/// GET /api/admin/stations/private/{id} — deep charger detail with gallery and
/// recent bookings.
pub async fn get_by_id(
    State(state): State<AppState>,
    _gate: AdminGate,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ChargerDetail>>, AppError> {
    let result = charger_service::find_by_id(&state.db, &id).await?;
    Ok(ApiResponse::success(result))
}

/// PATCH /api/admin/stations/private/{id} — update listing fields. Accepts nested
/// sections and flat fields; both are normalized before the update runs.
pub async fn update(
    State(state): State<AppState>,
    _gate: AdminGate,
    Path(id): Path<String>,
    Json(body): Json<UpdateChargerRequest>,
) -> Result<Json<ApiResponse<ChargerDetail>>, AppError> {
    let update = body.normalize();
    let result = charger_service::update(&state.db, &id, &update).await?;
    // The cached metadata host roster is derived from live listings.
    state.metadata_cache.invalidate().await;
    Ok(ApiResponse::success(result))
}

/// PATCH /api/admin/stations/private/{id}/status — publish/disable toggle.
pub async fn update_status(
    State(state): State<AppState>,
    _gate: AdminGate,
    Path(id): Path<String>,
    Json(body): Json<UpdateChargerStatus>,
) -> Result<Json<ApiResponse<ChargerDetail>>, AppError> {
    let result = charger_service::update_status(&state.db, &id, &body).await?;
    // Disabling or deleting a host's last listing drops them from the cached
    // host roster.
    state.metadata_cache.invalidate().await;
    Ok(ApiResponse::success(result))
}

/// POST /api/admin/stations/private/{id}/media — upload one image (multipart field
/// `file`) to the CDN and append it to the gallery.
pub async fn add_media(
    State(state): State<AppState>,
    _gate: AdminGate,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<MediaUploaded>>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Unreadable upload: {e}")))?;
        if bytes.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }

        let result =
            charger_service::add_media(&state.db, &state.cdn, &id, &filename, bytes.to_vec())
                .await?;
        return Ok(ApiResponse::success(result));
    }

    Err(AppError::Validation(
        "Multipart field 'file' is required".to_string(),
    ))
}

/// DELETE /api/admin/stations/private/{id}/media/{media_id} — remove one gallery
/// image.
pub async fn delete_media(
    State(state): State<AppState>,
    _gate: AdminGate,
    Path((id, media_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    charger_service::delete_media(&state.db, &state.cdn, &id, &media_id).await?;
    Ok(ApiResponse::success(serde_json::json!({ "deleted": media_id })))
}
