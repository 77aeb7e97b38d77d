//! Route definitions for the Chargerzilla admin API.

use axum::routing::{delete, get, patch, post};
use axum::Router;

use crate::AppState;

pub mod bookings;
pub mod chargers;
pub mod dashboard;
pub mod health;
pub mod metadata;
pub mod stations;
pub mod users;

/// Assemble the full API router. Health probes live at the root; everything
/// else is nested under `/api/admin`.
pub fn api_router() -> Router<AppState> {
    let admin_routes = Router::new()
        .route("/ping", get(health::ping))
        .route("/dashboard", get(dashboard::get_stats))
        .route("/metadata", get(metadata::get_metadata))
        .route("/zipcodes", get(metadata::list_zipcodes))
        .route("/bookings", get(bookings::list))
        .route("/bookings/stats", get(bookings::stats))
        .route("/bookings/{id}", get(bookings::get_by_id))
        .route("/bookings/{id}", patch(bookings::update))
        .route("/stations/private", get(chargers::list))
        .route("/stations/private/{id}", get(chargers::get_by_id))
        .route("/stations/private/{id}", patch(chargers::update))
        .route(
            "/stations/private/{id}/status",
            patch(chargers::update_status),
        )
        .route("/stations/private/{id}/media", post(chargers::add_media))
        .route(
            "/stations/private/{id}/media/{media_id}",
            delete(chargers::delete_media),
        )
        .route("/stations/public", get(stations::list))
        .route("/stations/public/{id}", get(stations::get_by_id))
        .route("/stations/public/{id}", patch(stations::update))
        .route(
            "/stations/public/{id}/media",
            delete(stations::delete_image),
        )
        .route("/users", get(users::list))
        .route("/users/{id}", get(users::get_by_id))
        .route("/users/{id}", patch(users::update));

    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .nest("/api/admin", admin_routes)
}
