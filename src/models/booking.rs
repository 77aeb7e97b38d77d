//! Booking row types and response DTOs.
//!
//! The booking table carries legacy data-quality quirks: `subtotal` and
//! `total_hours` are TEXT, and `charges`/`extras` are loosely-shaped JSON
//! blobs with string-typed amounts. Rows are fetched raw and coerced through
//! [`crate::models::money`]; shaping into the documented response contract
//! happens here.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::models::money;

/// Booking row joined with charger and guest display fields.
///
/// One shape serves the list endpoint, the detail endpoint, and the
/// statistics aggregation; the joins are LEFT so a booking whose charger or
/// guest was deleted still comes back.
#[derive(Debug, Clone, FromRow)]
pub struct BookingRow {
    pub id: String,
    pub charger_id: Option<String>,
    pub arrive_date: Option<NaiveDate>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub total_hours: Option<String>,
    pub subtotal: Option<String>,
    pub message: Option<String>,
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub payment_intent_id: Option<String>,
    pub charges: Option<Value>,
    pub extras: Option<Value>,
    pub created_by: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub charger_title: Option<String>,
    pub charger_address: Option<String>,
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
}

/// A purchased extra, parsed leniently from the `extras` JSON blob.
///
/// `enabled` defaults to true: only an explicit `false` excludes the extra
/// from revenue sums.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtraItem {
    pub name: String,
    pub price: Decimal,
    pub flat_fee: bool,
    pub enabled: bool,
}

/// Parse the extras blob into typed items. Non-array blobs and non-object
/// entries are dropped silently.
pub fn extra_items(raw: Option<&Value>) -> Vec<ExtraItem> {
    let Some(Value::Array(entries)) = raw else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            let obj = entry.as_object()?;
            Some(ExtraItem {
                name: obj
                    .get("name")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
                price: money::json_amount(obj.get("price")),
                flat_fee: obj
                    .get("flatFee")
                    .and_then(|v| v.as_bool())
                    .unwrap_or(false),
                enabled: obj
                    .get("enabled")
                    .and_then(|v| v.as_bool())
                    .unwrap_or(true),
            })
        })
        .collect()
}

/// Itemized charge breakdown as exposed to the dashboard.
///
/// Decorative enrichment only — fields need not sum to the subtotal.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChargesBreakdown {
    pub final_cost: f64,
    pub booking_fee: f64,
    pub stripe_flat_fee: f64,
    pub stripe_percentage_fee: f64,
    pub total_stripe_fee: f64,
    pub final_amount_charged: f64,
}

impl ChargesBreakdown {
    /// Shape the raw charges blob. Returns `None` when the blob is absent or
    /// not an object.
    pub fn from_raw(raw: Option<&Value>) -> Option<Self> {
        let obj = raw?.as_object()?;
        let amount = |key: &str| money::to_money(money::json_amount(obj.get(key)));
        Some(Self {
            final_cost: amount("finalCost"),
            booking_fee: amount("bookingFee"),
            stripe_flat_fee: amount("flatAmount"),
            stripe_percentage_fee: amount("percentageAmount"),
            total_stripe_fee: amount("totalStripeFee"),
            final_amount_charged: amount("finalAmount"),
        })
    }
}

/// Guest reference with placeholder for rows whose user is gone.
#[derive(Debug, Clone, Serialize)]
pub struct GuestRef {
    pub id: i32,
    pub name: String,
    pub email: Option<String>,
}

impl GuestRef {
    pub fn from_row(row: &BookingRow) -> Self {
        Self {
            id: row.created_by,
            name: row
                .guest_name
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            email: row.guest_email.clone(),
        }
    }
}

/// Charger reference. Hard-deleted chargers are substituted with a documented
/// placeholder instead of omitting the field.
#[derive(Debug, Clone, Serialize)]
pub struct ChargerRef {
    pub id: Option<String>,
    pub title: String,
    pub address: String,
}

impl ChargerRef {
    pub fn from_row(row: &BookingRow) -> Self {
        match &row.charger_title {
            Some(title) => Self {
                id: row.charger_id.clone(),
                title: title.clone(),
                address: row.charger_address.clone().unwrap_or_default(),
            },
            None => Self::placeholder(row.charger_id.clone()),
        }
    }

    pub fn placeholder(id: Option<String>) -> Self {
        Self {
            id,
            title: "Unknown".to_string(),
            address: String::new(),
        }
    }
}

/// Schedule block shared by summary and detail responses.
#[derive(Debug, Clone, Serialize)]
pub struct Schedule {
    pub arrive_date: Option<NaiveDate>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub total_hours: f64,
}

impl Schedule {
    pub fn from_row(row: &BookingRow) -> Self {
        Self {
            arrive_date: row.arrive_date,
            start_time: row.start_time.clone(),
            end_time: row.end_time.clone(),
            total_hours: money::to_money(money::parse_amount(row.total_hours.as_deref())),
        }
    }
}

/// Booking list entry.
#[derive(Debug, Serialize)]
pub struct BookingSummary {
    pub id: String,
    pub guest: GuestRef,
    pub charger: ChargerRef,
    pub schedule: Schedule,
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub subtotal: f64,
    pub has_message: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&BookingRow> for BookingSummary {
    fn from(row: &BookingRow) -> Self {
        Self {
            id: row.id.clone(),
            guest: GuestRef::from_row(row),
            charger: ChargerRef::from_row(row),
            schedule: Schedule::from_row(row),
            status: row.status.clone(),
            payment_status: row.payment_status.clone(),
            subtotal: money::to_money(money::parse_amount(row.subtotal.as_deref())),
            has_message: row.message.is_some(),
            created_at: row.created_at,
        }
    }
}

/// Financial block of the booking detail.
#[derive(Debug, Serialize)]
pub struct BookingFinancials {
    pub subtotal: f64,
    pub payment_status: Option<String>,
    pub stripe_payment_intent: Option<String>,
    pub charges_breakdown: Option<ChargesBreakdown>,
}

/// Extras entry as serialized in the detail response.
#[derive(Debug, Serialize)]
pub struct ExtraPurchased {
    pub name: String,
    pub price: f64,
    pub flat_fee: bool,
    pub enabled: bool,
}

impl From<&ExtraItem> for ExtraPurchased {
    fn from(item: &ExtraItem) -> Self {
        Self {
            name: item.name.clone(),
            price: money::to_money(item.price),
            flat_fee: item.flat_fee,
            enabled: item.enabled,
        }
    }
}

/// Timestamps block.
#[derive(Debug, Serialize)]
pub struct BookingMeta {
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Deep booking detail.
#[derive(Debug, Serialize)]
pub struct BookingDetail {
    pub id: String,
    pub guest: GuestRef,
    pub charger: ChargerRef,
    pub schedule: Schedule,
    pub booking_status: Option<String>,
    pub financials: BookingFinancials,
    pub extras_purchased: Vec<ExtraPurchased>,
    pub initial_message: Option<String>,
    pub meta: BookingMeta,
}

impl From<&BookingRow> for BookingDetail {
    fn from(row: &BookingRow) -> Self {
        Self {
            id: row.id.clone(),
            guest: GuestRef::from_row(row),
            charger: ChargerRef::from_row(row),
            schedule: Schedule::from_row(row),
            booking_status: row.status.clone(),
            financials: BookingFinancials {
                subtotal: money::to_money(money::parse_amount(row.subtotal.as_deref())),
                payment_status: row.payment_status.clone(),
                stripe_payment_intent: row.payment_intent_id.clone(),
                charges_breakdown: ChargesBreakdown::from_raw(row.charges.as_ref()),
            },
            extras_purchased: extra_items(row.extras.as_ref())
                .iter()
                .map(ExtraPurchased::from)
                .collect(),
            initial_message: row.message.clone(),
            meta: BookingMeta {
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

/// Admin-editable booking fields.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateBooking {
    pub status: Option<String>,
    pub payment_status: Option<String>,
}

impl UpdateBooking {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.payment_status.is_none()
    }
}

/// Per-field change record returned by the update endpoint.
#[derive(Debug, Serialize)]
pub struct FieldChange {
    pub field: &'static str,
    pub from: Option<String>,
    pub to: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row() -> BookingRow {
        BookingRow {
            id: "bk_1".to_string(),
            charger_id: Some("ch_1".to_string()),
            arrive_date: None,
            start_time: None,
            end_time: None,
            total_hours: Some("2.5".to_string()),
            subtotal: Some("10.005".to_string()),
            message: None,
            status: Some("Reserved".to_string()),
            payment_status: Some("pending".to_string()),
            payment_intent_id: None,
            charges: None,
            extras: None,
            created_by: 7,
            created_at: Utc::now(),
            updated_at: None,
            charger_title: None,
            charger_address: None,
            guest_name: None,
            guest_email: None,
        }
    }

    #[test]
    fn missing_charger_becomes_placeholder() {
        let summary = BookingSummary::from(&row());
        assert_eq!(summary.charger.title, "Unknown");
        assert_eq!(summary.charger.address, "");
        assert_eq!(summary.charger.id.as_deref(), Some("ch_1"));
    }

    #[test]
    fn missing_guest_becomes_placeholder() {
        let summary = BookingSummary::from(&row());
        assert_eq!(summary.guest.id, 7);
        assert_eq!(summary.guest.name, "Unknown");
        assert!(summary.guest.email.is_none());
    }

    #[test]
    fn subtotal_and_hours_are_cent_rounded() {
        let summary = BookingSummary::from(&row());
        assert_eq!(summary.subtotal, 10.01);
        assert_eq!(summary.schedule.total_hours, 2.5);
    }

    #[test]
    fn charges_blob_is_shaped_with_string_amounts() {
        let raw = json!({
            "finalCost": "2.75",
            "bookingFee": "0.25",
            "flatAmount": 0.30,
            "percentageAmount": "0.09",
            "totalStripeFee": "0.39",
            "finalAmount": 3.14
        });
        let shaped = ChargesBreakdown::from_raw(Some(&raw)).unwrap();
        assert_eq!(shaped.final_cost, 2.75);
        assert_eq!(shaped.booking_fee, 0.25);
        assert_eq!(shaped.stripe_flat_fee, 0.30);
        assert_eq!(shaped.total_stripe_fee, 0.39);
        assert_eq!(shaped.final_amount_charged, 3.14);
    }

    #[test]
    fn charges_absent_or_malformed_is_none() {
        assert!(ChargesBreakdown::from_raw(None).is_none());
        assert!(ChargesBreakdown::from_raw(Some(&json!("oops"))).is_none());
    }

    #[test]
    fn extras_default_enabled_and_tolerate_junk_entries() {
        let raw = json!([
            {"name": "Coke", "price": 1},
            {"name": "Car Wash", "price": "12.50", "flatFee": true, "enabled": false},
            "not-an-object",
            {"price": "garbage"}
        ]);
        let items = extra_items(Some(&raw));
        assert_eq!(items.len(), 3);
        assert!(items[0].enabled);
        assert!(!items[1].enabled);
        assert!(items[1].flat_fee);
        assert_eq!(items[2].price, rust_decimal::Decimal::ZERO);
    }

    #[test]
    fn update_booking_empty_detection() {
        assert!(UpdateBooking::default().is_empty());
        let update = UpdateBooking {
            status: Some("Completed".to_string()),
            payment_status: None,
        };
        assert!(!update.is_empty());
    }
}
