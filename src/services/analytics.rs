//! Booking statistics aggregation.
//!
//! Fetches booking rows (optionally filtered by an inclusive arrival-date
//! range) and reduces them in memory into the dashboard statistics contract.
//! All per-record coercion is total: garbage amounts count as zero, never as
//! a failed request. Only a data-access failure aborts, and then the whole
//! request fails with no partial payload.
//!
//! Conventions fixed here (the legacy service left them ambiguous):
//! - Monthly buckets use the booking's `created_at` in UTC, keyed `YYYY-MM`.
//! - "Completed" means payment status, lowercased, is `funds-released` or
//!   `captured`.
//! - Top-charger ties break by ascending charger id.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::booking::{extra_items, BookingRow};
use crate::models::money;

/// Number of entries in the top-chargers ranking.
pub const TOP_CHARGERS_LIMIT: usize = 5;

/// Payment statuses that count a booking as completed (compared lowercased).
const COMPLETED_PAYMENT_STATUSES: [&str; 2] = ["funds-released", "captured"];

/// Inclusive arrival-date range filter.
#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub struct DateRange {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

/// Full statistics payload for the bookings dashboard.
#[derive(Debug, Serialize)]
pub struct BookingStats {
    pub overview: Overview,
    pub status_breakdown: BTreeMap<String, i64>,
    pub payment_breakdown: BTreeMap<String, i64>,
    pub financials: Financials,
    pub monthly_trend: Vec<MonthlyPoint>,
    pub top_chargers: Vec<TopCharger>,
}

#[derive(Debug, Serialize)]
pub struct Overview {
    pub total_bookings: i64,
    pub completed_bookings: i64,
    pub total_hours_booked: f64,
    /// Whole-percent string, e.g. `"67%"`. `"0%"` for an empty collection.
    pub completion_rate: String,
}

#[derive(Debug, Serialize)]
pub struct Financials {
    pub total_revenue: f64,
    pub total_booking_fees: f64,
    pub total_stripe_fees: f64,
    pub total_extras_revenue: f64,
    /// Booking fees plus extras revenue, minus Stripe fees.
    pub net_platform_revenue: f64,
    pub average_booking_value: f64,
}

#[derive(Debug, Serialize)]
pub struct MonthlyPoint {
    /// Zero-padded `YYYY-MM` key; lexicographic order is chronological.
    pub month: String,
    pub bookings: i64,
    pub revenue: f64,
}

#[derive(Debug, Serialize)]
pub struct TopCharger {
    pub charger_id: String,
    pub title: String,
    pub address: String,
    pub bookings: i64,
    pub revenue: f64,
}

/// Fetch bookings in the range and aggregate them.
pub async fn booking_stats(pool: &PgPool, range: &DateRange) -> Result<BookingStats, AppError> {
    let rows = fetch_bookings(pool, range).await?;
    Ok(aggregate(&rows))
}

/// Booking rows with charger/guest display fields, date-filtered.
pub async fn fetch_bookings(
    pool: &PgPool,
    range: &DateRange,
) -> Result<Vec<BookingRow>, AppError> {
    let rows = sqlx::query_as::<_, BookingRow>(
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
        WHERE ($1::date IS NULL OR b.arrive_date >= $1)
          AND ($2::date IS NULL OR b.arrive_date <= $2)
        "#,
    )
    .bind(range.date_from)
    .bind(range.date_to)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

struct ChargerAccum {
    title: Option<String>,
    address: Option<String>,
    bookings: i64,
    revenue: Decimal,
}

/// Reduce booking rows into the statistics contract.
///
/// Pure and deterministic: breakdowns use ordered maps and the top-charger
/// sort has a total order, so the same input always serializes to the same
/// bytes.
pub fn aggregate(bookings: &[BookingRow]) -> BookingStats {
    let total_bookings = bookings.len() as i64;

    let mut status_breakdown: BTreeMap<String, i64> = BTreeMap::new();
    let mut payment_breakdown: BTreeMap<String, i64> = BTreeMap::new();
    let mut months: BTreeMap<String, (i64, Decimal)> = BTreeMap::new();
    let mut chargers: HashMap<String, ChargerAccum> = HashMap::new();

    let mut completed_bookings = 0i64;
    let mut total_revenue = Decimal::ZERO;
    let mut total_hours = Decimal::ZERO;
    let mut booking_fees = Decimal::ZERO;
    let mut stripe_fees = Decimal::ZERO;
    let mut extras_revenue = Decimal::ZERO;

    for booking in bookings {
        let subtotal = money::parse_amount(booking.subtotal.as_deref());
        total_revenue += subtotal;
        total_hours += money::parse_amount(booking.total_hours.as_deref());

        let status = booking
            .status
            .clone()
            .unwrap_or_else(|| "Unknown".to_string());
        *status_breakdown.entry(status).or_insert(0) += 1;

        let payment_status = booking
            .payment_status
            .clone()
            .unwrap_or_else(|| "unknown".to_string());
        if COMPLETED_PAYMENT_STATUSES.contains(&payment_status.to_ascii_lowercase().as_str()) {
            completed_bookings += 1;
        }
        *payment_breakdown.entry(payment_status).or_insert(0) += 1;

        if let Some(charges) = booking.charges.as_ref().and_then(|v| v.as_object()) {
            booking_fees += money::json_amount(charges.get("bookingFee"));
            stripe_fees += money::json_amount(charges.get("totalStripeFee"));
        }

        for extra in extra_items(booking.extras.as_ref()) {
            if extra.enabled {
                extras_revenue += extra.price;
            }
        }

        let month = booking.created_at.format("%Y-%m").to_string();
        let entry = months.entry(month).or_insert((0, Decimal::ZERO));
        entry.0 += 1;
        entry.1 += subtotal;

        if let Some(charger_id) = &booking.charger_id {
            let accum = chargers
                .entry(charger_id.clone())
                .or_insert_with(|| ChargerAccum {
                    title: None,
                    address: None,
                    bookings: 0,
                    revenue: Decimal::ZERO,
                });
            accum.bookings += 1;
            accum.revenue += subtotal;
            if accum.title.is_none() {
                accum.title = booking.charger_title.clone();
                accum.address = booking.charger_address.clone();
            }
        }
    }

    let rounded_revenue = money::round_cents(total_revenue);
    let average_booking_value = if total_bookings == 0 {
        0.0
    } else {
        money::to_money(rounded_revenue / Decimal::from(total_bookings))
    };

    let completion_rate = if total_bookings == 0 {
        "0%".to_string()
    } else {
        let percent = (Decimal::from(completed_bookings) * Decimal::from(100)
            / Decimal::from(total_bookings))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        format!("{percent}%")
    };

    let monthly_trend = months
        .into_iter()
        .map(|(month, (count, revenue))| MonthlyPoint {
            month,
            bookings: count,
            revenue: money::to_money(revenue),
        })
        .collect();

    let mut top_chargers: Vec<TopCharger> = chargers
        .into_iter()
        .map(|(charger_id, accum)| TopCharger {
            charger_id,
            title: accum.title.unwrap_or_else(|| "Unknown".to_string()),
            address: accum.address.unwrap_or_default(),
            bookings: accum.bookings,
            revenue: money::to_money(accum.revenue),
        })
        .collect();
    top_chargers.sort_by(|a, b| {
        b.bookings
            .cmp(&a.bookings)
            .then_with(|| a.charger_id.cmp(&b.charger_id))
    });
    top_chargers.truncate(TOP_CHARGERS_LIMIT);

    BookingStats {
        overview: Overview {
            total_bookings,
            completed_bookings,
            total_hours_booked: money::to_money(total_hours),
            completion_rate,
        },
        status_breakdown,
        payment_breakdown,
        financials: Financials {
            total_revenue: money::to_money(total_revenue),
            total_booking_fees: money::to_money(booking_fees),
            total_stripe_fees: money::to_money(stripe_fees),
            total_extras_revenue: money::to_money(extras_revenue),
            net_platform_revenue: money::to_money(
                booking_fees + extras_revenue - stripe_fees,
            ),
            average_booking_value,
        },
        monthly_trend,
        top_chargers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn booking(
        id: &str,
        charger_id: Option<&str>,
        status: &str,
        payment_status: &str,
        subtotal: &str,
        created: (i32, u32, u32),
    ) -> BookingRow {
        BookingRow {
            id: id.to_string(),
            charger_id: charger_id.map(str::to_string),
            arrive_date: None,
            start_time: None,
            end_time: None,
            total_hours: Some("1".to_string()),
            subtotal: Some(subtotal.to_string()),
            message: None,
            status: Some(status.to_string()),
            payment_status: Some(payment_status.to_string()),
            payment_intent_id: None,
            charges: None,
            extras: None,
            created_by: 1,
            created_at: Utc
                .with_ymd_and_hms(created.0, created.1, created.2, 12, 0, 0)
                .unwrap(),
            updated_at: None,
            charger_title: charger_id.map(|c| format!("Charger {c}")),
            charger_address: charger_id.map(|_| "1 Volt Way".to_string()),
            guest_name: None,
            guest_email: None,
        }
    }

    fn sample() -> Vec<BookingRow> {
        vec![
            booking("b1", Some("c1"), "Completed", "captured", "10.005", (2024, 1, 15)),
            booking("b2", Some("c1"), "Reserved", "pending", "5.00", (2024, 1, 20)),
            booking("b3", Some("c2"), "Completed", "funds-released", "20.00", (2024, 2, 1)),
        ]
    }

    #[test]
    fn worked_example_matches_contract() {
        let stats = aggregate(&sample());

        assert_eq!(stats.overview.total_bookings, 3);
        assert_eq!(stats.overview.completed_bookings, 2);
        assert_eq!(stats.overview.completion_rate, "67%");

        assert_eq!(stats.monthly_trend.len(), 2);
        assert_eq!(stats.monthly_trend[0].month, "2024-01");
        assert_eq!(stats.monthly_trend[0].bookings, 2);
        assert_eq!(stats.monthly_trend[0].revenue, 15.01);
        assert_eq!(stats.monthly_trend[1].month, "2024-02");
        assert_eq!(stats.monthly_trend[1].bookings, 1);
        assert_eq!(stats.monthly_trend[1].revenue, 20.0);
    }

    #[test]
    fn status_breakdown_sums_to_total() {
        let stats = aggregate(&sample());
        let sum: i64 = stats.status_breakdown.values().sum();
        assert_eq!(sum, stats.overview.total_bookings);
        let payment_sum: i64 = stats.payment_breakdown.values().sum();
        assert_eq!(payment_sum, stats.overview.total_bookings);
    }

    #[test]
    fn empty_collection_reports_zeroes_not_nan() {
        let stats = aggregate(&[]);
        assert_eq!(stats.overview.total_bookings, 0);
        assert_eq!(stats.overview.completion_rate, "0%");
        assert_eq!(stats.financials.average_booking_value, 0.0);
        assert_eq!(stats.financials.total_revenue, 0.0);
        assert!(stats.monthly_trend.is_empty());
        assert!(stats.top_chargers.is_empty());
    }

    #[test]
    fn average_booking_value_is_rounded_quotient() {
        let stats = aggregate(&sample());
        // 35.01 / 3
        assert_eq!(stats.financials.average_booking_value, 11.67);
        assert_eq!(stats.financials.total_revenue, 35.01);
    }

    #[test]
    fn malformed_subtotal_contributes_zero() {
        let mut rows = sample();
        rows.push(booking("b4", Some("c2"), "Waiting", "pending", "N/A", (2024, 2, 10)));
        let stats = aggregate(&rows);
        assert_eq!(stats.overview.total_bookings, 4);
        assert_eq!(stats.financials.total_revenue, 35.01);
        assert_eq!(stats.monthly_trend[1].revenue, 20.0);
    }

    #[test]
    fn completion_classification_is_case_insensitive() {
        let rows = vec![
            booking("b1", None, "Completed", "Captured", "1.00", (2024, 3, 1)),
            booking("b2", None, "Completed", "FUNDS-RELEASED", "1.00", (2024, 3, 2)),
            booking("b3", None, "Reserved", "pending", "1.00", (2024, 3, 3)),
        ];
        let stats = aggregate(&rows);
        assert_eq!(stats.overview.completed_bookings, 2);
    }

    #[test]
    fn extras_revenue_skips_explicitly_disabled() {
        let mut row = booking("b1", None, "Completed", "captured", "0", (2024, 1, 1));
        row.extras = Some(json!([
            {"name": "Coke", "price": "1.50"},
            {"name": "Vacuum", "price": 2, "enabled": true},
            {"name": "Wash", "price": "9.99", "enabled": false}
        ]));
        let stats = aggregate(&[row]);
        assert_eq!(stats.financials.total_extras_revenue, 3.5);
    }

    #[test]
    fn charges_fees_accumulate_from_string_amounts() {
        let mut row = booking("b1", None, "Completed", "captured", "10", (2024, 1, 1));
        row.charges = Some(json!({
            "finalCost": "9.50",
            "bookingFee": "0.50",
            "totalStripeFee": "0.41"
        }));
        let stats = aggregate(&[row.clone(), row]);
        assert_eq!(stats.financials.total_booking_fees, 1.0);
        assert_eq!(stats.financials.total_stripe_fees, 0.82);
        assert_eq!(stats.financials.net_platform_revenue, 0.18);
    }

    #[test]
    fn top_chargers_ranked_with_stable_tiebreak() {
        let rows = vec![
            booking("b1", Some("c_b"), "Completed", "captured", "4.00", (2024, 1, 1)),
            booking("b2", Some("c_a"), "Completed", "captured", "3.00", (2024, 1, 2)),
            booking("b3", Some("c_c"), "Completed", "captured", "1.00", (2024, 1, 3)),
            booking("b4", Some("c_c"), "Completed", "captured", "1.00", (2024, 1, 4)),
        ];
        let stats = aggregate(&rows);
        assert_eq!(stats.top_chargers[0].charger_id, "c_c");
        assert_eq!(stats.top_chargers[0].bookings, 2);
        // c_a and c_b tie on count; ascending id breaks the tie.
        assert_eq!(stats.top_chargers[1].charger_id, "c_a");
        assert_eq!(stats.top_chargers[2].charger_id, "c_b");
    }

    #[test]
    fn top_chargers_capped_at_limit() {
        let rows: Vec<BookingRow> = (0..8)
            .map(|i| {
                booking(
                    &format!("b{i}"),
                    Some(&format!("c{i}")),
                    "Completed",
                    "captured",
                    "1.00",
                    (2024, 1, 1 + i as u32),
                )
            })
            .collect();
        let stats = aggregate(&rows);
        assert_eq!(stats.top_chargers.len(), TOP_CHARGERS_LIMIT);
    }

    #[test]
    fn bookings_without_charger_missing_from_ranking() {
        let rows = vec![
            booking("b1", None, "Completed", "captured", "4.00", (2024, 1, 1)),
            booking("b2", Some("c1"), "Completed", "captured", "3.00", (2024, 1, 2)),
        ];
        let stats = aggregate(&rows);
        assert_eq!(stats.top_chargers.len(), 1);
        assert_eq!(stats.top_chargers[0].charger_id, "c1");
    }

    #[test]
    fn hard_deleted_charger_gets_placeholder_name() {
        let mut row = booking("b1", Some("ghost"), "Completed", "captured", "2.00", (2024, 1, 1));
        row.charger_title = None;
        row.charger_address = None;
        let stats = aggregate(&[row]);
        assert_eq!(stats.top_chargers[0].title, "Unknown");
        assert_eq!(stats.top_chargers[0].address, "");
    }

    #[test]
    fn aggregation_is_idempotent() {
        let rows = sample();
        let first = serde_json::to_string(&aggregate(&rows)).unwrap();
        let second = serde_json::to_string(&aggregate(&rows)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn monthly_trend_sorted_without_duplicates() {
        let rows = vec![
            booking("b1", None, "Completed", "captured", "1", (2024, 3, 1)),
            booking("b2", None, "Completed", "captured", "1", (2023, 12, 1)),
            booking("b3", None, "Completed", "captured", "1", (2024, 3, 9)),
            booking("b4", None, "Completed", "captured", "1", (2024, 1, 5)),
        ];
        let stats = aggregate(&rows);
        let keys: Vec<&str> = stats.monthly_trend.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(keys, vec!["2023-12", "2024-01", "2024-03"]);
        assert_eq!(stats.monthly_trend[2].bookings, 2);
    }
}
