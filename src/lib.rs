pub mod config;
pub mod db;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use sqlx::PgPool;

use crate::services::cdn::CloudflareImages;
use crate::services::metadata::MetadataCache;

/// Shared application state passed to all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: config::AppConfig,
    pub metadata_cache: Arc<MetadataCache>,
    pub cdn: Arc<CloudflareImages>,
}

impl AppState {
    pub fn new(db: PgPool, config: config::AppConfig) -> Self {
        let cdn = Arc::new(CloudflareImages::new(config.cdn_credentials()));
        Self {
            db,
            config,
            metadata_cache: Arc::new(MetadataCache::new()),
            cdn,
        }
    }
}
