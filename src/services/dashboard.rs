//! Dashboard aggregation queries for the admin overview page.
//!
//! KPIs, geography/network/facility distributions, 30-day trends, and the
//! recent-activity feed are fetched with parallel queries and assembled into
//! one response. Revenue sums guard against the legacy TEXT `subtotal`
//! column: only numeric-looking values are cast, everything else counts as
//! zero.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::money;

/// Platform share of gross booking revenue.
const PLATFORM_FEE_RATE: Decimal = Decimal::from_parts(15, 0, 0, false, 2); // 0.15

/// Entries in the recent-activity feed.
const ACTIVITY_FEED_LIMIT: i64 = 10;

/// SQL fragment: cast `subtotal` only when it looks numeric.
const NUMERIC_SUBTOTAL: &str =
    r"CASE WHEN b.subtotal ~ '^-?[0-9]+(\.[0-9]+)?$' THEN b.subtotal::numeric ELSE 0 END";

/// Full dashboard payload.
#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub kpis: Kpis,
    pub geography: Geography,
    pub networks: Vec<NamedCount>,
    pub facilities: Vec<NamedCount>,
    pub levels: Vec<NamedCount>,
    pub trends: Trends,
    pub recent_activity: Vec<ActivityItem>,
}

#[derive(Debug, Serialize)]
pub struct Kpis {
    pub total_users: i64,
    pub active_users: i64,
    pub verified_users: i64,
    pub total_hosts: i64,
    pub total_chargers: i64,
    pub published_chargers: i64,
    pub total_stations: i64,
    pub total_bookings: i64,
    /// Bookings in a live state (reserved or waiting).
    pub active_bookings: i64,
    /// Sum of captured booking subtotals.
    pub gross_revenue: f64,
    /// Estimated platform share of gross revenue.
    pub platform_revenue: f64,
}

#[derive(Debug, Serialize)]
pub struct Geography {
    pub by_state: Vec<NamedCount>,
    pub by_city: Vec<NamedCount>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct NamedCount {
    pub name: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct Trends {
    pub signups: Vec<DailyCount>,
    pub revenue: Vec<DailyRevenue>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct DailyCount {
    pub day: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct DailyRevenue {
    pub day: NaiveDate,
    pub revenue: f64,
}

#[derive(Debug, sqlx::FromRow)]
struct DailyRevenueRow {
    day: NaiveDate,
    revenue: Decimal,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ActivityItem {
    pub kind: String,
    pub reference: String,
    pub label: String,
    pub occurred_at: chrono::DateTime<chrono::Utc>,
}

/// Fetch all dashboard statistics in parallel queries.
pub async fn get_stats(pool: &PgPool) -> Result<DashboardStats, AppError> {
    let (kpis, by_state, by_city, networks, facilities, levels, signups, revenue, recent_activity) =
        tokio::try_join!(
            fetch_kpis(pool),
            fetch_states(pool),
            fetch_cities(pool),
            fetch_networks(pool),
            fetch_facilities(pool),
            fetch_levels(pool),
            fetch_signup_trend(pool),
            fetch_revenue_trend(pool),
            fetch_recent_activity(pool),
        )?;

    Ok(DashboardStats {
        kpis,
        geography: Geography { by_state, by_city },
        networks,
        facilities,
        levels,
        trends: Trends { signups, revenue },
        recent_activity,
    })
}

#[derive(Debug, sqlx::FromRow)]
struct KpiRow {
    total_users: i64,
    active_users: i64,
    verified_users: i64,
    total_hosts: i64,
    total_chargers: i64,
    published_chargers: i64,
    total_stations: i64,
    total_bookings: i64,
    active_bookings: i64,
    gross_revenue: Decimal,
}

async fn fetch_kpis(pool: &PgPool) -> Result<Kpis, AppError> {
    let sql = format!(
        r#"
        SELECT
            (SELECT COUNT(*) FROM users) AS total_users,
            (SELECT COUNT(*) FROM users WHERE active_status = TRUE AND delete_status = FALSE) AS active_users,
            (SELECT COUNT(*) FROM users WHERE is_email_verified = TRUE) AS verified_users,
            (SELECT COUNT(DISTINCT created_by) FROM charger_listings WHERE deleted = FALSE) AS total_hosts,
            (SELECT COUNT(*) FROM charger_listings WHERE deleted = FALSE) AS total_chargers,
            (SELECT COUNT(*) FROM charger_listings
             WHERE deleted = FALSE AND published = TRUE AND disabled = FALSE) AS published_chargers,
            (SELECT COUNT(*) FROM charging_stations) AS total_stations,
            (SELECT COUNT(*) FROM bookings) AS total_bookings,
            (SELECT COUNT(*) FROM bookings WHERE status IN ('Reserved', 'Waiting')) AS active_bookings,
            (SELECT COALESCE(SUM({NUMERIC_SUBTOTAL}), 0) FROM bookings b
             WHERE LOWER(b.payment_status) IN ('captured', 'funds-released')) AS gross_revenue
        "#
    );
    let row = sqlx::query_as::<_, KpiRow>(&sql).fetch_one(pool).await?;

    Ok(Kpis {
        total_users: row.total_users,
        active_users: row.active_users,
        verified_users: row.verified_users,
        total_hosts: row.total_hosts,
        total_chargers: row.total_chargers,
        published_chargers: row.published_chargers,
        total_stations: row.total_stations,
        total_bookings: row.total_bookings,
        active_bookings: row.active_bookings,
        gross_revenue: money::to_money(row.gross_revenue),
        platform_revenue: money::to_money(row.gross_revenue * PLATFORM_FEE_RATE),
    })
}

/// Station counts by state, top 15. Stations without a resolvable state fall
/// under 'Other'.
async fn fetch_states(pool: &PgPool) -> Result<Vec<NamedCount>, AppError> {
    let rows = sqlx::query_as::<_, NamedCount>(
        r#"
        SELECT COALESCE(st.state_name, 'Other') AS name, COUNT(*) AS count
        FROM charging_stations s
        LEFT JOIN cities ci ON ci.id = s.city_id
        LEFT JOIN states st ON st.id = ci.state_id
        GROUP BY COALESCE(st.state_name, 'Other')
        ORDER BY count DESC, name ASC
        LIMIT 15
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Station counts by city, top 20.
async fn fetch_cities(pool: &PgPool) -> Result<Vec<NamedCount>, AppError> {
    let rows = sqlx::query_as::<_, NamedCount>(
        r#"
        SELECT COALESCE(ci.city_name, 'Unknown') AS name, COUNT(*) AS count
        FROM charging_stations s
        LEFT JOIN cities ci ON ci.id = s.city_id
        GROUP BY COALESCE(ci.city_name, 'Unknown')
        ORDER BY count DESC, name ASC
        LIMIT 20
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Station counts by network; unbranded stations show as 'Independent'.
async fn fetch_networks(pool: &PgPool) -> Result<Vec<NamedCount>, AppError> {
    let rows = sqlx::query_as::<_, NamedCount>(
        r#"
        SELECT COALESCE(n.network_name, 'Independent') AS name, COUNT(*) AS count
        FROM charging_stations s
        LEFT JOIN network_types n ON n.id = s.network_type_id
        GROUP BY COALESCE(n.network_name, 'Independent')
        ORDER BY count DESC, name ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Station counts by facility type; unclassified stations show as 'General'.
async fn fetch_facilities(pool: &PgPool) -> Result<Vec<NamedCount>, AppError> {
    let rows = sqlx::query_as::<_, NamedCount>(
        r#"
        SELECT COALESCE(f.facility_name, 'General') AS name, COUNT(*) AS count
        FROM charging_stations s
        LEFT JOIN facility_types f ON f.id = s.facility_type_id
        GROUP BY COALESCE(f.facility_name, 'General')
        ORDER BY count DESC, name ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Station counts by charging level.
async fn fetch_levels(pool: &PgPool) -> Result<Vec<NamedCount>, AppError> {
    let rows = sqlx::query_as::<_, NamedCount>(
        r#"
        SELECT COALESCE(s.level, 'Unknown') AS name, COUNT(*) AS count
        FROM charging_stations s
        GROUP BY COALESCE(s.level, 'Unknown')
        ORDER BY count DESC, name ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Daily user signups over the last 30 days. Days with no signups are
/// omitted rather than zero-filled; the dashboard chart fills gaps.
async fn fetch_signup_trend(pool: &PgPool) -> Result<Vec<DailyCount>, AppError> {
    let rows = sqlx::query_as::<_, DailyCount>(
        r#"
        SELECT created_at::date AS day, COUNT(*) AS count
        FROM users
        WHERE created_at >= NOW() - INTERVAL '30 days'
        GROUP BY created_at::date
        ORDER BY day ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Daily captured revenue over the last 30 days.
async fn fetch_revenue_trend(pool: &PgPool) -> Result<Vec<DailyRevenue>, AppError> {
    let sql = format!(
        r#"
        SELECT b.created_at::date AS day,
               COALESCE(SUM({NUMERIC_SUBTOTAL}), 0) AS revenue
        FROM bookings b
        WHERE b.created_at >= NOW() - INTERVAL '30 days'
          AND LOWER(b.payment_status) IN ('captured', 'funds-released')
        GROUP BY b.created_at::date
        ORDER BY day ASC
        "#
    );
    let rows = sqlx::query_as::<_, DailyRevenueRow>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(rows
        .into_iter()
        .map(|r| DailyRevenue {
            day: r.day,
            revenue: money::to_money(r.revenue),
        })
        .collect())
}

/// Interleaved feed of recent bookings, listings, and signups.
async fn fetch_recent_activity(pool: &PgPool) -> Result<Vec<ActivityItem>, AppError> {
    let rows = sqlx::query_as::<_, ActivityItem>(
        r#"
        SELECT * FROM (
            SELECT 'booking' AS kind, b.id AS reference,
                   COALESCE(c.title, 'Unknown') AS label,
                   b.created_at AS occurred_at
            FROM bookings b
            LEFT JOIN charger_listings c ON c.id = b.charger_id
            UNION ALL
            SELECT 'listing' AS kind, c.id AS reference,
                   COALESCE(c.title, 'Untitled') AS label,
                   c.created_at AS occurred_at
            FROM charger_listings c
            WHERE c.deleted = FALSE
            UNION ALL
            SELECT 'signup' AS kind, u.id::text AS reference,
                   u.name AS label,
                   u.created_at AS occurred_at
            FROM users u
        ) feed
        ORDER BY occurred_at DESC
        LIMIT $1
        "#,
    )
    .bind(ACTIVITY_FEED_LIMIT)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
