//! Metadata routes: cached lookup payload and the zipcode search.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::AdminGate;
use crate::models::lookup::Zipcode;
use crate::services::metadata::{self as metadata_service, AdminMetadata, METADATA_CACHE_TTL};
use crate::AppState;

/// Metadata payload plus cache provenance.
#[derive(Debug, Serialize)]
pub struct MetadataResponse {
    #[serde(flatten)]
    pub metadata: Arc<AdminMetadata>,
    pub cached: bool,
}

/// GET /api/admin/metadata — lookup tables and enumerations, TTL-cached.
pub async fn get_metadata(
    State(state): State<AppState>,
    _gate: AdminGate,
) -> Result<Json<ApiResponse<MetadataResponse>>, AppError> {
    let pool = state.db.clone();
    let (metadata, cached) = state
        .metadata_cache
        .get_or_refresh(METADATA_CACHE_TTL, || async move {
            metadata_service::fetch_metadata(&pool).await
        })
        .await?;
    Ok(ApiResponse::success(MetadataResponse { metadata, cached }))
}

#[derive(Debug, Deserialize)]
pub struct ZipcodeQuery {
    pub search: Option<String>,
    pub limit: Option<i64>,
}

/// GET /api/admin/zipcodes — prefix search over the zipcode table. Served
/// outside the metadata cache because of its size.
pub async fn list_zipcodes(
    State(state): State<AppState>,
    _gate: AdminGate,
    Query(query): Query<ZipcodeQuery>,
) -> Result<Json<ApiResponse<Vec<Zipcode>>>, AppError> {
    let limit = query.limit.unwrap_or(50).clamp(1, 500);
    let rows =
        metadata_service::list_zipcodes(&state.db, query.search.as_deref(), limit).await?;
    Ok(ApiResponse::success(rows))
}
