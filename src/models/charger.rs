//! Private charger (host-listed) row types, DTOs, and update normalization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Charger listing row joined with host display fields and first media URL.
#[derive(Debug, Clone, FromRow)]
pub struct ChargerRow {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub connector_type: Option<String>,
    pub power_output: Option<f64>,
    pub voltage: Option<i32>,
    pub amperage: Option<i32>,
    pub level2_ports: Option<i32>,
    pub dcfast_ports: Option<i32>,
    pub price_per_hour: Option<f64>,
    pub weekend_price: Option<f64>,
    pub cancellation_policy: Option<String>,
    pub amenities: Option<Vec<String>>,
    pub facilities: Option<Vec<String>>,
    pub access: Option<String>,
    pub deleted: bool,
    pub disabled: bool,
    pub draft: bool,
    pub published: bool,
    pub created_by: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub host_name: Option<String>,
    pub host_email: Option<String>,
    pub host_phone: Option<String>,
    pub media_url: Option<String>,
}

/// Host reference with placeholder for deleted accounts.
#[derive(Debug, Clone, Serialize)]
pub struct HostRef {
    pub id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl HostRef {
    pub fn from_row(row: &ChargerRow) -> Self {
        Self {
            id: row.created_by,
            name: row
                .host_name
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            email: row.host_email.clone(),
            phone: row.host_phone.clone(),
        }
    }
}

/// Charger list entry.
#[derive(Debug, Serialize)]
pub struct ChargerSummary {
    pub id: String,
    pub title: Option<String>,
    pub address: Option<String>,
    pub connector_type: Option<String>,
    pub price_per_hour: Option<f64>,
    pub status: ChargerStatusFlags,
    pub host: HostRef,
    pub thumbnail: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChargerStatusFlags {
    pub published: bool,
    pub disabled: bool,
    pub draft: bool,
}

impl From<&ChargerRow> for ChargerSummary {
    fn from(row: &ChargerRow) -> Self {
        Self {
            id: row.id.clone(),
            title: row.title.clone(),
            address: row.address.clone(),
            connector_type: row.connector_type.clone(),
            price_per_hour: row.price_per_hour,
            status: ChargerStatusFlags {
                published: row.published,
                disabled: row.disabled,
                draft: row.draft,
            },
            host: HostRef::from_row(row),
            thumbnail: row.media_url.clone(),
            created_at: row.created_at,
        }
    }
}

/// Media gallery entry.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MediaItem {
    pub id: String,
    pub url: String,
}

/// Nested detail response mirroring the dashboard contract.
#[derive(Debug, Serialize)]
pub struct ChargerDetail {
    pub id: String,
    pub identity: ChargerIdentity,
    pub location: ChargerLocation,
    pub pricing: ChargerPricing,
    pub specs: ChargerSpecs,
    pub gallery: Vec<MediaItem>,
    pub amenities: ChargerAmenities,
    pub activity_log: Vec<crate::models::booking::BookingSummary>,
    pub meta: ChargerMeta,
}

#[derive(Debug, Serialize)]
pub struct ChargerIdentity {
    pub title: Option<String>,
    pub description: Option<String>,
    pub host: HostRef,
    pub status: ChargerStatusFlags,
}

#[derive(Debug, Serialize)]
pub struct ChargerLocation {
    pub address: Option<String>,
    pub coordinates: Coordinates,
    pub access_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Coordinates {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ChargerPricing {
    pub hourly: Option<f64>,
    pub weekend: Option<f64>,
    pub cancellation_policy: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChargerSpecs {
    pub connector_type: Option<String>,
    pub power_output_kw: Option<f64>,
    pub voltage: Option<i32>,
    pub amperage: Option<i32>,
    pub ports: ChargerPorts,
}

#[derive(Debug, Serialize)]
pub struct ChargerPorts {
    pub l2: Option<i32>,
    pub dc: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct ChargerAmenities {
    pub list: Vec<String>,
    pub facilities: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ChargerMeta {
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ChargerDetail {
    pub fn assemble(
        row: &ChargerRow,
        gallery: Vec<MediaItem>,
        activity_log: Vec<crate::models::booking::BookingSummary>,
    ) -> Self {
        Self {
            id: row.id.clone(),
            identity: ChargerIdentity {
                title: row.title.clone(),
                description: row.description.clone(),
                host: HostRef::from_row(row),
                status: ChargerStatusFlags {
                    published: row.published,
                    disabled: row.disabled,
                    draft: row.draft,
                },
            },
            location: ChargerLocation {
                address: row.address.clone(),
                coordinates: Coordinates {
                    lat: row.lat,
                    lng: row.lng,
                },
                access_type: row.access.clone(),
            },
            pricing: ChargerPricing {
                hourly: row.price_per_hour,
                weekend: row.weekend_price,
                cancellation_policy: row.cancellation_policy.clone(),
            },
            specs: ChargerSpecs {
                connector_type: row.connector_type.clone(),
                power_output_kw: row.power_output,
                voltage: row.voltage,
                amperage: row.amperage,
                ports: ChargerPorts {
                    l2: row.level2_ports,
                    dc: row.dcfast_ports,
                },
            },
            gallery,
            amenities: ChargerAmenities {
                list: row.amenities.clone().unwrap_or_default(),
                facilities: row.facilities.clone().unwrap_or_default(),
            },
            activity_log,
            meta: ChargerMeta {
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

// --- Update payload normalization -------------------------------------------
//
// The dashboard sends either nested sections (identity/location/pricing/...)
// or a handful of flat fields, sometimes both in one request. All accepted
// shapes are merged into one canonical `ChargerUpdate` before a single SQL
// UPDATE; flat fields win over nested ones when both are present.

#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateChargerRequest {
    pub identity: Option<IdentitySection>,
    pub location: Option<LocationSection>,
    pub pricing: Option<PricingSection>,
    pub specs: Option<SpecsSection>,
    pub amenities: Option<AmenitiesSection>,
    pub deleted: Option<bool>,
    pub access: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct IdentitySection {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<StatusSection>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StatusSection {
    pub published: Option<bool>,
    pub disabled: Option<bool>,
    pub draft: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LocationSection {
    pub address: Option<String>,
    pub coordinates: Option<CoordinatesSection>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CoordinatesSection {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PricingSection {
    pub hourly: Option<f64>,
    pub weekend: Option<f64>,
    pub cancellation_policy: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SpecsSection {
    pub connector_type: Option<String>,
    pub power_output_kw: Option<f64>,
    pub voltage: Option<i32>,
    pub amperage: Option<i32>,
    pub ports: Option<PortsSection>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PortsSection {
    pub l2: Option<i32>,
    pub dc: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AmenitiesSection {
    pub list: Option<Vec<String>>,
    pub facilities: Option<Vec<String>>,
}

/// Canonical flat update applied by the service layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChargerUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub published: Option<bool>,
    pub disabled: Option<bool>,
    pub draft: Option<bool>,
    pub price_per_hour: Option<f64>,
    pub weekend_price: Option<f64>,
    pub cancellation_policy: Option<String>,
    pub connector_type: Option<String>,
    pub power_output: Option<f64>,
    pub voltage: Option<i32>,
    pub amperage: Option<i32>,
    pub level2_ports: Option<i32>,
    pub dcfast_ports: Option<i32>,
    pub amenities: Option<Vec<String>>,
    pub facilities: Option<Vec<String>>,
    pub deleted: Option<bool>,
    pub access: Option<String>,
}

impl ChargerUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

impl UpdateChargerRequest {
    /// Merge all accepted shapes into the canonical update struct.
    pub fn normalize(self) -> ChargerUpdate {
        let mut update = ChargerUpdate::default();

        if let Some(identity) = self.identity {
            update.title = identity.title;
            update.description = identity.description;
            if let Some(status) = identity.status {
                update.published = status.published;
                update.disabled = status.disabled;
                update.draft = status.draft;
            }
        }
        if let Some(location) = self.location {
            update.address = location.address;
            if let Some(coordinates) = location.coordinates {
                update.lat = coordinates.lat;
                update.lng = coordinates.lng;
            }
        }
        if let Some(pricing) = self.pricing {
            update.price_per_hour = pricing.hourly;
            update.weekend_price = pricing.weekend;
            update.cancellation_policy = pricing.cancellation_policy;
        }
        if let Some(specs) = self.specs {
            update.connector_type = specs.connector_type;
            update.power_output = specs.power_output_kw;
            update.voltage = specs.voltage;
            update.amperage = specs.amperage;
            if let Some(ports) = specs.ports {
                update.level2_ports = ports.l2;
                update.dcfast_ports = ports.dc;
            }
        }
        if let Some(amenities) = self.amenities {
            update.amenities = amenities.list;
            update.facilities = amenities.facilities;
        }

        // Flat fallback fields
        update.deleted = self.deleted;
        update.access = self.access;

        update
    }
}

/// Quick publish/disable toggle payload.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateChargerStatus {
    pub published: Option<bool>,
    pub disabled: Option<bool>,
}

impl UpdateChargerStatus {
    pub fn is_empty(&self) -> bool {
        self.published.is_none() && self.disabled.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_sections_normalize_to_flat_update() {
        let request: UpdateChargerRequest = serde_json::from_value(serde_json::json!({
            "identity": {
                "title": "Garage Charger",
                "status": { "published": true, "draft": false }
            },
            "pricing": { "hourly": 3.5 },
            "specs": { "ports": { "l2": 2 } }
        }))
        .unwrap();

        let update = request.normalize();
        assert_eq!(update.title.as_deref(), Some("Garage Charger"));
        assert_eq!(update.published, Some(true));
        assert_eq!(update.draft, Some(false));
        assert_eq!(update.price_per_hour, Some(3.5));
        assert_eq!(update.level2_ports, Some(2));
        assert!(update.description.is_none());
        assert!(!update.is_empty());
    }

    #[test]
    fn flat_fields_survive_alongside_nested() {
        let request: UpdateChargerRequest = serde_json::from_value(serde_json::json!({
            "location": { "address": "12 Volt St", "coordinates": { "lat": 40.1 } },
            "deleted": true,
            "access": "gated"
        }))
        .unwrap();

        let update = request.normalize();
        assert_eq!(update.address.as_deref(), Some("12 Volt St"));
        assert_eq!(update.lat, Some(40.1));
        assert!(update.lng.is_none());
        assert_eq!(update.deleted, Some(true));
        assert_eq!(update.access.as_deref(), Some("gated"));
    }

    #[test]
    fn empty_body_normalizes_to_empty_update() {
        let update = UpdateChargerRequest::default().normalize();
        assert!(update.is_empty());
    }
}
