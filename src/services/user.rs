//! User service: listing with activity counts, detail, and admin updates.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use crate::errors::AppError;
use crate::models::booking::{BookingRow, BookingSummary};
use crate::models::charger::{ChargerRow, ChargerSummary};
use crate::models::pagination::{PagedResult, Pagination};
use crate::models::user::{UpdateUser, UserProfile, UserRow, UserSummary};

/// Recent items shown on the user detail page.
const RECENT_ITEMS_LIMIT: i64 = 10;

/// Filters for listing users.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UserFilters {
    pub role: Option<String>,
    pub active_status: Option<bool>,
    pub delete_status: Option<bool>,
    pub is_email_verified: Option<bool>,
    pub search: Option<String>,
}

const SELECT_COLUMNS: &str = "u.id, u.name, u.email, u.role, u.phone, \
     u.active_status, u.delete_status, u.is_email_verified, u.is_stripe_verified, \
     u.stripe_customer_id, u.stripe_account_id, u.created_at, u.updated_at, \
     (SELECT COUNT(*) FROM charger_listings c \
      WHERE c.created_by = u.id AND c.deleted = FALSE) AS listing_count, \
     (SELECT COUNT(*) FROM bookings b WHERE b.created_by = u.id) AS booking_count";

/// List users with listing/booking counts computed per row.
pub async fn list(
    pool: &PgPool,
    filters: &UserFilters,
    pagination: &Pagination,
) -> Result<PagedResult<UserSummary>, AppError> {
    let mut conditions: Vec<String> = Vec::new();
    let mut param_index = 0u32;

    if filters.role.is_some() {
        param_index += 1;
        conditions.push(format!("u.role = ${param_index}"));
    }
    if filters.active_status.is_some() {
        param_index += 1;
        conditions.push(format!("u.active_status = ${param_index}"));
    }
    if filters.delete_status.is_some() {
        param_index += 1;
        conditions.push(format!("u.delete_status = ${param_index}"));
    }
    if filters.is_email_verified.is_some() {
        param_index += 1;
        conditions.push(format!("u.is_email_verified = ${param_index}"));
    }
    if filters.search.is_some() {
        param_index += 1;
        conditions.push(format!(
            "(u.name ILIKE ${param_index} OR u.email ILIKE ${param_index} \
             OR u.phone ILIKE ${param_index})"
        ));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) FROM users u {where_clause}");
    let data_sql = format!(
        "SELECT {SELECT_COLUMNS} FROM users u {where_clause} \
         ORDER BY u.created_at DESC, u.id ASC LIMIT {} OFFSET {}",
        pagination.limit(),
        pagination.offset()
    );

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    let mut data_query = sqlx::query_as::<_, UserRow>(&data_sql);

    macro_rules! bind_both {
        ($val:expr) => {
            count_query = count_query.bind($val);
            data_query = data_query.bind($val);
        };
    }

    if let Some(ref role) = filters.role {
        bind_both!(role);
    }
    if let Some(active) = filters.active_status {
        bind_both!(active);
    }
    if let Some(deleted) = filters.delete_status {
        bind_both!(deleted);
    }
    if let Some(verified) = filters.is_email_verified {
        bind_both!(verified);
    }
    if let Some(ref search) = filters.search {
        let pattern = format!("%{search}%");
        count_query = count_query.bind(pattern.clone());
        data_query = data_query.bind(pattern);
    }

    let total = count_query.fetch_one(pool).await?;
    let rows = data_query.fetch_all(pool).await?;
    let items = rows.iter().map(UserSummary::from).collect();

    Ok(PagedResult::new(items, total, pagination))
}

/// User detail: profile plus recent listings and booking history.
#[derive(Debug, Serialize)]
pub struct UserDetail {
    pub profile: UserProfile,
    pub listings: Vec<ChargerSummary>,
    pub booking_history: Vec<BookingSummary>,
}

async fn fetch_row(pool: &PgPool, id: i32) -> Result<UserRow, AppError> {
    let sql = format!("SELECT {SELECT_COLUMNS} FROM users u WHERE u.id = $1");
    sqlx::query_as::<_, UserRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))
}

/// Fetch one user with their recent activity.
pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<UserDetail, AppError> {
    let row = fetch_row(pool, id).await?;

    let listings = sqlx::query_as::<_, ChargerRow>(
        r#"
        SELECT c.id, c.title, c.description, c.address, c.lat, c.lng,
            c.connector_type, c.power_output, c.voltage, c.amperage,
            c.level2_ports, c.dcfast_ports, c.price_per_hour, c.weekend_price,
            c.cancellation_policy, c.amenities, c.facilities, c.access,
            c.deleted, c.disabled, c.draft, c.published, c.created_by,
            c.created_at, c.updated_at,
            u.name AS host_name, u.email AS host_email, u.phone AS host_phone,
            (SELECT m.url FROM charger_media m WHERE m.charger_id = c.id
             ORDER BY m.position ASC, m.id ASC LIMIT 1) AS media_url
        FROM charger_listings c
        LEFT JOIN users u ON u.id = c.created_by
        WHERE c.created_by = $1 AND c.deleted = FALSE
        ORDER BY c.created_at DESC
        LIMIT $2
        "#,
    )
    .bind(id)
    .bind(RECENT_ITEMS_LIMIT)
    .fetch_all(pool)
    .await?;

    let bookings = sqlx::query_as::<_, BookingRow>(
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
        WHERE b.created_by = $1
        ORDER BY b.created_at DESC
        LIMIT $2
        "#,
    )
    .bind(id)
    .bind(RECENT_ITEMS_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(UserDetail {
        profile: UserProfile::from(&row),
        listings: listings.iter().map(ChargerSummary::from).collect(),
        booking_history: bookings.iter().map(BookingSummary::from).collect(),
    })
}

/// Apply an admin update to a user account.
pub async fn update(pool: &PgPool, id: i32, update: &UpdateUser) -> Result<UserDetail, AppError> {
    if update.is_empty() {
        return Err(AppError::Validation(
            "Update body contains no recognized fields".to_string(),
        ));
    }
    update
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let result = sqlx::query(
        r#"
        UPDATE users SET
            name = COALESCE($2, name),
            email = COALESCE($3, email),
            phone = COALESCE($4, phone),
            role = COALESCE($5, role),
            active_status = COALESCE($6, active_status),
            delete_status = COALESCE($7, delete_status),
            is_email_verified = COALESCE($8, is_email_verified),
            is_stripe_verified = COALESCE($9, is_stripe_verified),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(&update.name)
    .bind(&update.email)
    .bind(&update.phone)
    .bind(&update.role)
    .bind(update.active_status)
    .bind(update.delete_status)
    .bind(update.is_email_verified)
    .bind(update.is_stripe_verified)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("User {id} not found")));
    }

    find_by_id(pool, id).await
}
