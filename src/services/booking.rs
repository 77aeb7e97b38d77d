//! Booking service: filtered listing, detail lookup, and admin updates.

use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::booking::{
    BookingDetail, BookingRow, BookingSummary, FieldChange, UpdateBooking,
};
use crate::models::pagination::{PagedResult, Pagination};

/// Columns the list endpoint may sort by. Anything else falls back to
/// `created_at` rather than erroring, so stale dashboard links keep working.
const SORTABLE_COLUMNS: [&str; 5] = [
    "created_at",
    "arrive_date",
    "subtotal",
    "status",
    "payment_status",
];

/// Filters for listing bookings.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct BookingFilters {
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub charger_id: Option<String>,
    pub guest_id: Option<i32>,
    /// Filter through the charger's owner.
    pub host_id: Option<i32>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
}

impl BookingFilters {
    fn order_clause(&self) -> String {
        let column = self
            .sort_by
            .as_deref()
            .filter(|c| SORTABLE_COLUMNS.contains(c))
            .unwrap_or("created_at");
        let direction = match self.sort_dir.as_deref() {
            Some("asc") => "ASC",
            _ => "DESC",
        };
        format!("ORDER BY b.{column} {direction}, b.id ASC")
    }
}

const SELECT_COLUMNS: &str = "b.id, b.charger_id, b.arrive_date, b.start_time, b.end_time, \
     b.total_hours, b.subtotal, b.message, b.status, b.payment_status, \
     b.payment_intent_id, b.charges, b.extras, b.created_by, \
     b.created_at, b.updated_at, \
     c.title AS charger_title, c.address AS charger_address, \
     u.name AS guest_name, u.email AS guest_email";

const FROM_JOINED: &str = "FROM bookings b \
     LEFT JOIN charger_listings c ON c.id = b.charger_id \
     LEFT JOIN users u ON u.id = b.created_by";

/// List bookings with filters, pagination, and whitelisted sorting.
pub async fn list(
    pool: &PgPool,
    filters: &BookingFilters,
    pagination: &Pagination,
) -> Result<PagedResult<BookingSummary>, AppError> {
    let mut conditions: Vec<String> = Vec::new();
    let mut param_index = 0u32;

    if filters.status.is_some() {
        param_index += 1;
        conditions.push(format!("b.status = ${param_index}"));
    }
    if filters.payment_status.is_some() {
        param_index += 1;
        conditions.push(format!("b.payment_status = ${param_index}"));
    }
    if filters.charger_id.is_some() {
        param_index += 1;
        conditions.push(format!("b.charger_id = ${param_index}"));
    }
    if filters.guest_id.is_some() {
        param_index += 1;
        conditions.push(format!("b.created_by = ${param_index}"));
    }
    if filters.host_id.is_some() {
        param_index += 1;
        conditions.push(format!("c.created_by = ${param_index}"));
    }
    if filters.date_from.is_some() {
        param_index += 1;
        conditions.push(format!("b.arrive_date >= ${param_index}"));
    }
    if filters.date_to.is_some() {
        param_index += 1;
        conditions.push(format!("b.arrive_date <= ${param_index}"));
    }
    if filters.search.is_some() {
        param_index += 1;
        conditions.push(format!(
            "(b.id ILIKE ${param_index} OR b.message ILIKE ${param_index} \
             OR c.title ILIKE ${param_index} OR u.name ILIKE ${param_index} \
             OR u.email ILIKE ${param_index})"
        ));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) {FROM_JOINED} {where_clause}");
    let data_sql = format!(
        "SELECT {SELECT_COLUMNS} {FROM_JOINED} {where_clause} {} LIMIT {} OFFSET {}",
        filters.order_clause(),
        pagination.limit(),
        pagination.offset()
    );

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    let mut data_query = sqlx::query_as::<_, BookingRow>(&data_sql);

    macro_rules! bind_both {
        ($val:expr) => {
            count_query = count_query.bind($val);
            data_query = data_query.bind($val);
        };
    }

    if let Some(ref status) = filters.status {
        bind_both!(status);
    }
    if let Some(ref payment) = filters.payment_status {
        bind_both!(payment);
    }
    if let Some(ref charger_id) = filters.charger_id {
        bind_both!(charger_id);
    }
    if let Some(guest_id) = filters.guest_id {
        bind_both!(guest_id);
    }
    if let Some(host_id) = filters.host_id {
        bind_both!(host_id);
    }
    if let Some(date_from) = filters.date_from {
        bind_both!(date_from);
    }
    if let Some(date_to) = filters.date_to {
        bind_both!(date_to);
    }
    if let Some(ref search) = filters.search {
        let pattern = format!("%{search}%");
        count_query = count_query.bind(pattern.clone());
        data_query = data_query.bind(pattern);
    }

    let total = count_query.fetch_one(pool).await?;
    let rows = data_query.fetch_all(pool).await?;
    let items = rows.iter().map(BookingSummary::from).collect();

    Ok(PagedResult::new(items, total, pagination))
}

/// Fetch one booking with charger and guest context.
pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<BookingDetail, AppError> {
    let sql = format!("SELECT {SELECT_COLUMNS} {FROM_JOINED} WHERE b.id = $1");
    let row = sqlx::query_as::<_, BookingRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Booking {id} not found")))?;
    Ok(BookingDetail::from(&row))
}

/// Apply an admin update and report per-field changes.
///
/// Rejects an empty body up front; the dashboard treats a no-op PATCH as a
/// client bug, not a success.
pub async fn update(
    pool: &PgPool,
    id: &str,
    update: &UpdateBooking,
) -> Result<(BookingDetail, Vec<FieldChange>), AppError> {
    if update.is_empty() {
        return Err(AppError::Validation(
            "At least one of status or payment_status is required".to_string(),
        ));
    }

    // Snapshot and update run in one transaction with the row locked, so the
    // reported `from` values are exactly what this PATCH replaced.
    let mut tx = pool.begin().await?;

    let before = sqlx::query_as::<_, (Option<String>, Option<String>)>(
        "SELECT status, payment_status FROM bookings WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Booking {id} not found")))?;

    let mut changes = Vec::new();
    if let Some(status) = &update.status {
        if before.0.as_deref() != Some(status) {
            changes.push(FieldChange {
                field: "status",
                from: before.0.clone(),
                to: status.clone(),
            });
        }
    }
    if let Some(payment_status) = &update.payment_status {
        if before.1.as_deref() != Some(payment_status) {
            changes.push(FieldChange {
                field: "payment_status",
                from: before.1.clone(),
                to: payment_status.clone(),
            });
        }
    }

    sqlx::query(
        r#"
        UPDATE bookings SET
            status = COALESCE($2, status),
            payment_status = COALESCE($3, payment_status),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(&update.status)
    .bind(&update.payment_status)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    let detail = find_by_id(pool, id).await?;
    Ok((detail, changes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_sort_column_falls_back_to_created_at() {
        let filters = BookingFilters {
            sort_by: Some("charges; DROP TABLE bookings".to_string()),
            ..Default::default()
        };
        assert!(filters.order_clause().contains("b.created_at DESC"));
    }

    #[test]
    fn whitelisted_sort_column_is_honored() {
        let filters = BookingFilters {
            sort_by: Some("arrive_date".to_string()),
            sort_dir: Some("asc".to_string()),
            ..Default::default()
        };
        assert_eq!(
            filters.order_clause(),
            "ORDER BY b.arrive_date ASC, b.id ASC"
        );
    }

    #[test]
    fn sort_direction_defaults_to_descending() {
        let filters = BookingFilters {
            sort_by: Some("subtotal".to_string()),
            sort_dir: Some("sideways".to_string()),
            ..Default::default()
        };
        assert_eq!(filters.order_clause(), "ORDER BY b.subtotal DESC, b.id ASC");
    }
}
