//! Platform user row types and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// User row with per-user activity counts computed in SQL.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: String,
    pub phone: Option<String>,
    pub active_status: bool,
    pub delete_status: bool,
    pub is_email_verified: bool,
    pub is_stripe_verified: bool,
    pub stripe_customer_id: Option<String>,
    pub stripe_account_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub listing_count: i64,
    pub booking_count: i64,
}

/// User list entry with quick activity stats.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: String,
    pub phone: Option<String>,
    pub active_status: bool,
    pub delete_status: bool,
    pub is_email_verified: bool,
    pub is_stripe_verified: bool,
    pub created_at: DateTime<Utc>,
    pub stats: UserStats,
}

#[derive(Debug, Serialize)]
pub struct UserStats {
    pub listings: i64,
    pub bookings: i64,
}

impl From<&UserRow> for UserSummary {
    fn from(row: &UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name.clone(),
            email: row.email.clone(),
            role: row.role.clone(),
            phone: row.phone.clone(),
            active_status: row.active_status,
            delete_status: row.delete_status,
            is_email_verified: row.is_email_verified,
            is_stripe_verified: row.is_stripe_verified,
            created_at: row.created_at,
            stats: UserStats {
                listings: row.listing_count,
                bookings: row.booking_count,
            },
        }
    }
}

/// Full profile block of the user detail response.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: String,
    pub phone: Option<String>,
    pub active_status: bool,
    pub delete_status: bool,
    pub is_email_verified: bool,
    pub is_stripe_verified: bool,
    pub stripe_customer_id: Option<String>,
    pub stripe_account_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&UserRow> for UserProfile {
    fn from(row: &UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name.clone(),
            email: row.email.clone(),
            role: row.role.clone(),
            phone: row.phone.clone(),
            active_status: row.active_status,
            delete_status: row.delete_status,
            is_email_verified: row.is_email_verified,
            is_stripe_verified: row.is_stripe_verified,
            stripe_customer_id: row.stripe_customer_id.clone(),
            stripe_account_id: row.stripe_account_id.clone(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Admin-editable user fields.
#[derive(Debug, Clone, Deserialize, Default, Validate)]
pub struct UpdateUser {
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub active_status: Option<bool>,
    pub delete_status: Option<bool>,
    pub is_email_verified: Option<bool>,
    pub is_stripe_verified: Option<bool>,
}

impl UpdateUser {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.role.is_none()
            && self.active_status.is_none()
            && self.delete_status.is_none()
            && self.is_email_verified.is_none()
            && self.is_stripe_verified.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn summary_carries_activity_counts() {
        let row = UserRow {
            id: 1,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            role: "host".to_string(),
            phone: None,
            active_status: true,
            delete_status: false,
            is_email_verified: true,
            is_stripe_verified: false,
            stripe_customer_id: None,
            stripe_account_id: None,
            created_at: Utc::now(),
            updated_at: None,
            listing_count: 3,
            booking_count: 11,
        };
        let summary = UserSummary::from(&row);
        assert_eq!(summary.stats.listings, 3);
        assert_eq!(summary.stats.bookings, 11);
    }

    #[test]
    fn update_validates_email_format() {
        let update = UpdateUser {
            email: Some("not-an-email".to_string()),
            ..Default::default()
        };
        assert!(update.validate().is_err());

        let update = UpdateUser {
            email: Some("ok@example.com".to_string()),
            ..Default::default()
        };
        assert!(update.validate().is_ok());
    }

    #[test]
    fn update_empty_detection() {
        assert!(UpdateUser::default().is_empty());
        assert!(!UpdateUser {
            role: Some("admin".to_string()),
            ..Default::default()
        }
        .is_empty());
    }
}
