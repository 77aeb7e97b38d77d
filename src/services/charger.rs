//! Private charger listing service: filtered listing, deep detail, updates,
//! and media gallery management.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::booking::{BookingRow, BookingSummary};
use crate::models::charger::{
    ChargerDetail, ChargerRow, ChargerSummary, ChargerUpdate, MediaItem, UpdateChargerStatus,
};
use crate::models::pagination::{PagedResult, Pagination};
use crate::services::cdn::CloudflareImages;

/// Bookings shown in a charger's activity log.
const ACTIVITY_LOG_LIMIT: i64 = 10;

/// Filters for listing chargers.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ChargerFilters {
    pub published: Option<bool>,
    pub disabled: Option<bool>,
    pub draft: Option<bool>,
    pub deleted: Option<bool>,
    pub host_id: Option<i32>,
    /// Substring match; listings store connector types as free text.
    pub connector_type: Option<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub search: Option<String>,
}

const SELECT_COLUMNS: &str = "c.id, c.title, c.description, c.address, c.lat, c.lng, \
     c.connector_type, c.power_output, c.voltage, c.amperage, \
     c.level2_ports, c.dcfast_ports, c.price_per_hour, c.weekend_price, \
     c.cancellation_policy, c.amenities, c.facilities, c.access, \
     c.deleted, c.disabled, c.draft, c.published, c.created_by, \
     c.created_at, c.updated_at, \
     u.name AS host_name, u.email AS host_email, u.phone AS host_phone, \
     (SELECT m.url FROM charger_media m WHERE m.charger_id = c.id \
      ORDER BY m.position ASC, m.id ASC LIMIT 1) AS media_url";

const FROM_JOINED: &str = "FROM charger_listings c LEFT JOIN users u ON u.id = c.created_by";

/// List chargers. Soft-deleted listings are hidden unless the `deleted`
/// filter asks for them explicitly.
pub async fn list(
    pool: &PgPool,
    filters: &ChargerFilters,
    pagination: &Pagination,
) -> Result<PagedResult<ChargerSummary>, AppError> {
    let mut conditions: Vec<String> = Vec::new();
    let mut param_index = 0u32;

    match filters.deleted {
        Some(_) => {
            param_index += 1;
            conditions.push(format!("c.deleted = ${param_index}"));
        }
        None => conditions.push("c.deleted = FALSE".to_string()),
    }
    if filters.published.is_some() {
        param_index += 1;
        conditions.push(format!("c.published = ${param_index}"));
    }
    if filters.disabled.is_some() {
        param_index += 1;
        conditions.push(format!("c.disabled = ${param_index}"));
    }
    if filters.draft.is_some() {
        param_index += 1;
        conditions.push(format!("c.draft = ${param_index}"));
    }
    if filters.host_id.is_some() {
        param_index += 1;
        conditions.push(format!("c.created_by = ${param_index}"));
    }
    if filters.connector_type.is_some() {
        param_index += 1;
        conditions.push(format!("c.connector_type ILIKE ${param_index}"));
    }
    if filters.price_min.is_some() {
        param_index += 1;
        conditions.push(format!("c.price_per_hour >= ${param_index}"));
    }
    if filters.price_max.is_some() {
        param_index += 1;
        conditions.push(format!("c.price_per_hour <= ${param_index}"));
    }
    if filters.search.is_some() {
        param_index += 1;
        conditions.push(format!(
            "(c.title ILIKE ${param_index} OR c.address ILIKE ${param_index} \
             OR u.name ILIKE ${param_index})"
        ));
    }

    let where_clause = format!("WHERE {}", conditions.join(" AND "));
    let count_sql = format!("SELECT COUNT(*) {FROM_JOINED} {where_clause}");
    let data_sql = format!(
        "SELECT {SELECT_COLUMNS} {FROM_JOINED} {where_clause} \
         ORDER BY c.created_at DESC, c.id ASC LIMIT {} OFFSET {}",
        pagination.limit(),
        pagination.offset()
    );

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    let mut data_query = sqlx::query_as::<_, ChargerRow>(&data_sql);

    macro_rules! bind_both {
        ($val:expr) => {
            count_query = count_query.bind($val);
            data_query = data_query.bind($val);
        };
    }

    if let Some(deleted) = filters.deleted {
        bind_both!(deleted);
    }
    if let Some(published) = filters.published {
        bind_both!(published);
    }
    if let Some(disabled) = filters.disabled {
        bind_both!(disabled);
    }
    if let Some(draft) = filters.draft {
        bind_both!(draft);
    }
    if let Some(host_id) = filters.host_id {
        bind_both!(host_id);
    }
    if let Some(ref connector) = filters.connector_type {
        let pattern = format!("%{connector}%");
        count_query = count_query.bind(pattern.clone());
        data_query = data_query.bind(pattern);
    }
    if let Some(price_min) = filters.price_min {
        bind_both!(price_min);
    }
    if let Some(price_max) = filters.price_max {
        bind_both!(price_max);
    }
    if let Some(ref search) = filters.search {
        let pattern = format!("%{search}%");
        count_query = count_query.bind(pattern.clone());
        data_query = data_query.bind(pattern);
    }

    let total = count_query.fetch_one(pool).await?;
    let rows = data_query.fetch_all(pool).await?;
    let items = rows.iter().map(ChargerSummary::from).collect();

    Ok(PagedResult::new(items, total, pagination))
}

async fn fetch_row(pool: &PgPool, id: &str) -> Result<ChargerRow, AppError> {
    let sql = format!("SELECT {SELECT_COLUMNS} {FROM_JOINED} WHERE c.id = $1");
    sqlx::query_as::<_, ChargerRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Charger {id} not found")))
}

/// Deep detail: listing, full gallery, and recent booking activity.
pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<ChargerDetail, AppError> {
    let row = fetch_row(pool, id).await?;

    let gallery = sqlx::query_as::<_, MediaItem>(
        "SELECT id, url FROM charger_media WHERE charger_id = $1 \
         ORDER BY position ASC, id ASC",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    let activity = sqlx::query_as::<_, BookingRow>(
        r#"
        SELECT
            b.id, b.charger_id, b.arrive_date, b.start_time, b.end_time,
            b.total_hours, b.subtotal, b.message, b.status, b.payment_status,
            b.payment_intent_id, b.charges, b.extras, b.created_by,
            b.created_at, b.updated_at,
            c.title AS charger_title, c.address AS charger_address,
            u.name AS guest_name, u.email AS guest_email
        FROM bookings b
        LEFT JOIN charger_listings c ON c.id = b.charger_id
        LEFT JOIN users u ON u.id = b.created_by
        WHERE b.charger_id = $1
        ORDER BY b.created_at DESC
        LIMIT $2
        "#,
    )
    .bind(id)
    .bind(ACTIVITY_LOG_LIMIT)
    .fetch_all(pool)
    .await?;

    let activity_log = activity.iter().map(BookingSummary::from).collect();
    Ok(ChargerDetail::assemble(&row, gallery, activity_log))
}

/// Apply a normalized admin update.
pub async fn update(
    pool: &PgPool,
    id: &str,
    update: &ChargerUpdate,
) -> Result<ChargerDetail, AppError> {
    if update.is_empty() {
        return Err(AppError::Validation(
            "Update body contains no recognized fields".to_string(),
        ));
    }

    let result = sqlx::query(
        r#"
        UPDATE charger_listings SET
            title = COALESCE($2, title),
            description = COALESCE($3, description),
            address = COALESCE($4, address),
            lat = COALESCE($5, lat),
            lng = COALESCE($6, lng),
            published = COALESCE($7, published),
            disabled = COALESCE($8, disabled),
            draft = COALESCE($9, draft),
            price_per_hour = COALESCE($10, price_per_hour),
            weekend_price = COALESCE($11, weekend_price),
            cancellation_policy = COALESCE($12, cancellation_policy),
            connector_type = COALESCE($13, connector_type),
            power_output = COALESCE($14, power_output),
            voltage = COALESCE($15, voltage),
            amperage = COALESCE($16, amperage),
            level2_ports = COALESCE($17, level2_ports),
            dcfast_ports = COALESCE($18, dcfast_ports),
            amenities = COALESCE($19, amenities),
            facilities = COALESCE($20, facilities),
            deleted = COALESCE($21, deleted),
            access = COALESCE($22, access),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(&update.title)
    .bind(&update.description)
    .bind(&update.address)
    .bind(update.lat)
    .bind(update.lng)
    .bind(update.published)
    .bind(update.disabled)
    .bind(update.draft)
    .bind(update.price_per_hour)
    .bind(update.weekend_price)
    .bind(&update.cancellation_policy)
    .bind(&update.connector_type)
    .bind(update.power_output)
    .bind(update.voltage)
    .bind(update.amperage)
    .bind(update.level2_ports)
    .bind(update.dcfast_ports)
    .bind(&update.amenities)
    .bind(&update.facilities)
    .bind(update.deleted)
    .bind(&update.access)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Charger {id} not found")));
    }

    find_by_id(pool, id).await
}

/// Quick publish/disable toggle.
pub async fn update_status(
    pool: &PgPool,
    id: &str,
    status: &UpdateChargerStatus,
) -> Result<ChargerDetail, AppError> {
    if status.is_empty() {
        return Err(AppError::Validation(
            "At least one of published or disabled is required".to_string(),
        ));
    }

    let result = sqlx::query(
        r#"
        UPDATE charger_listings SET
            published = COALESCE($2, published),
            disabled = COALESCE($3, disabled),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(status.published)
    .bind(status.disabled)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Charger {id} not found")));
    }

    find_by_id(pool, id).await
}

/// Outcome of a media upload.
#[derive(Debug, Serialize)]
pub struct MediaUploaded {
    pub id: String,
    pub url: String,
}

/// Upload one image to the CDN and append it to the charger's gallery.
pub async fn add_media(
    pool: &PgPool,
    cdn: &CloudflareImages,
    charger_id: &str,
    filename: &str,
    bytes: Vec<u8>,
) -> Result<MediaUploaded, AppError> {
    // Verify the listing exists before touching the CDN.
    fetch_row(pool, charger_id).await?;

    let media_id = Uuid::new_v4().to_string();
    let url = cdn.upload_image(&media_id, filename, bytes).await?;

    sqlx::query(
        r#"
        INSERT INTO charger_media (id, charger_id, url, position)
        VALUES ($1, $2, $3,
            COALESCE((SELECT MAX(position) + 1 FROM charger_media WHERE charger_id = $2), 0))
        "#,
    )
    .bind(&media_id)
    .bind(charger_id)
    .bind(&url)
    .execute(pool)
    .await?;

    Ok(MediaUploaded { id: media_id, url })
}

/// Remove one gallery entry and its CDN copy.
///
/// The media row must belong to the addressed charger; a mismatched pair is
/// rejected rather than silently deleting someone else's image.
pub async fn delete_media(
    pool: &PgPool,
    cdn: &CloudflareImages,
    charger_id: &str,
    media_id: &str,
) -> Result<(), AppError> {
    let owner = sqlx::query_scalar::<_, String>(
        "SELECT charger_id FROM charger_media WHERE id = $1",
    )
    .bind(media_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Media {media_id} not found")))?;

    if owner != charger_id {
        return Err(AppError::Forbidden(
            "Media does not belong to this charger".to_string(),
        ));
    }

    sqlx::query("DELETE FROM charger_media WHERE id = $1")
        .bind(media_id)
        .execute(pool)
        .await?;

    // CDN cleanup is best effort once the row is gone; the admin already got
    // what they asked for and a retry would only hit NotFound.
    if let Err(err) = cdn.delete_image(media_id).await {
        tracing::warn!(media_id = %media_id, error = %err, "CDN delete failed after gallery row removal");
    }

    Ok(())
}
