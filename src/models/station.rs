//! Public charging station row types and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Station row joined with its lookup names.
#[derive(Debug, Clone, FromRow)]
pub struct StationRow {
    pub id: i32,
    pub station_name: String,
    pub street_address: Option<String>,
    pub city_id: Option<i32>,
    pub network_type_id: Option<i32>,
    pub facility_type_id: Option<i32>,
    pub station_image: Option<String>,
    pub status: Option<String>,
    pub online: Option<bool>,
    pub pricing: Option<String>,
    pub access: Option<String>,
    pub total_ports: Option<i32>,
    pub level: Option<String>,
    pub chademo: Option<i32>,
    pub chademo_power: Option<i32>,
    pub j1772: Option<i32>,
    pub j1772_power: Option<i32>,
    pub ccs: Option<i32>,
    pub ccs_power: Option<i32>,
    pub tesla: Option<i32>,
    pub tesla_power: Option<i32>,
    pub nema1450: Option<i32>,
    pub nema515: Option<i32>,
    pub nema520: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub city_name: Option<String>,
    pub state_name: Option<String>,
    pub zipcode: Option<String>,
    pub network_name: Option<String>,
    pub facility_name: Option<String>,
}

/// Lookup reference `{id, name}` with placeholder substitution handled by the
/// caller-provided default.
#[derive(Debug, Clone, Serialize)]
pub struct LookupRef {
    pub id: Option<i32>,
    pub name: Option<String>,
}

/// Station list entry.
#[derive(Debug, Serialize)]
pub struct StationSummary {
    pub id: i32,
    pub name: String,
    pub address: Option<String>,
    pub status: Option<String>,
    pub online: Option<bool>,
    pub level: Option<String>,
    pub total_ports: Option<i32>,
    pub city: LookupRef,
    pub network: LookupRef,
    pub facility: LookupRef,
}

impl From<&StationRow> for StationSummary {
    fn from(row: &StationRow) -> Self {
        Self {
            id: row.id,
            name: row.station_name.clone(),
            address: row.street_address.clone(),
            status: row.status.clone(),
            online: row.online,
            level: row.level.clone(),
            total_ports: row.total_ports,
            city: LookupRef {
                id: row.city_id,
                name: row.city_name.clone(),
            },
            network: LookupRef {
                id: row.network_type_id,
                name: row.network_name.clone(),
            },
            facility: LookupRef {
                id: row.facility_type_id,
                name: row.facility_name.clone(),
            },
        }
    }
}

/// Connector entry in the detail response. Only types with at least one port
/// are listed.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConnectorPort {
    pub r#type: &'static str,
    pub count: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_kw: Option<i32>,
}

/// Nested station detail.
#[derive(Debug, Serialize)]
pub struct StationDetail {
    pub id: i32,
    pub identity: StationIdentity,
    pub location: StationLocation,
    pub media: StationMedia,
    pub connectors: StationConnectors,
    pub meta: StationMeta,
}

#[derive(Debug, Serialize)]
pub struct StationIdentity {
    pub name: String,
    pub status: Option<String>,
    pub pricing: Option<String>,
    pub access: Option<String>,
    pub online: Option<bool>,
    pub network: Option<String>,
    pub network_type_id: Option<i32>,
    pub facility: Option<String>,
    pub facility_type_id: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct StationLocation {
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub coordinates: StationCoordinates,
}

#[derive(Debug, Serialize)]
pub struct StationCoordinates {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct StationMedia {
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StationConnectors {
    pub summary: ConnectorSummary,
    pub types: Vec<ConnectorPort>,
}

#[derive(Debug, Serialize)]
pub struct ConnectorSummary {
    pub total_ports: Option<i32>,
    pub level: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StationMeta {
    pub created: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Collect present connector types, dropping zero-count entries.
pub fn connector_ports(row: &StationRow) -> Vec<ConnectorPort> {
    let candidates = [
        ("CHAdeMO", row.chademo, row.chademo_power),
        ("J1772", row.j1772, row.j1772_power),
        ("CCS", row.ccs, row.ccs_power),
        ("Tesla", row.tesla, row.tesla_power),
        ("NEMA 14-50", row.nema1450, None),
        ("NEMA 5-15", row.nema515, None),
        ("NEMA 5-20", row.nema520, None),
    ];
    candidates
        .into_iter()
        .filter_map(|(name, count, power)| {
            let count = count.unwrap_or(0);
            (count > 0).then_some(ConnectorPort {
                r#type: name,
                count,
                power_kw: power,
            })
        })
        .collect()
}

impl From<&StationRow> for StationDetail {
    fn from(row: &StationRow) -> Self {
        Self {
            id: row.id,
            identity: StationIdentity {
                name: row.station_name.clone(),
                status: row.status.clone(),
                pricing: row.pricing.clone(),
                access: row.access.clone(),
                online: row.online,
                network: row.network_name.clone(),
                network_type_id: row.network_type_id,
                facility: row.facility_name.clone(),
                facility_type_id: row.facility_type_id,
            },
            location: StationLocation {
                address: row.street_address.clone(),
                city: row.city_name.clone(),
                state: row.state_name.clone(),
                zip: row.zipcode.clone(),
                coordinates: StationCoordinates {
                    lat: row.latitude,
                    lng: row.longitude,
                },
            },
            media: StationMedia {
                image: row.station_image.clone(),
            },
            connectors: StationConnectors {
                summary: ConnectorSummary {
                    total_ports: row.total_ports,
                    level: row.level.clone(),
                },
                types: connector_ports(row),
            },
            meta: StationMeta {
                created: row.created_at,
                last_updated: row.updated_at,
            },
        }
    }
}

/// Admin-editable station fields. `image_url` is an alias the dashboard
/// sends for `station_image`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateStation {
    pub station_name: Option<String>,
    pub street_address: Option<String>,
    pub status: Option<String>,
    pub online: Option<bool>,
    pub pricing: Option<String>,
    pub access: Option<String>,
    pub total_ports: Option<i32>,
    pub level: Option<String>,
    pub chademo: Option<i32>,
    pub ccs: Option<i32>,
    pub tesla: Option<i32>,
    pub j1772: Option<i32>,
    pub nema1450: Option<i32>,
    pub nema515: Option<i32>,
    pub nema520: Option<i32>,
    pub chademo_power: Option<i32>,
    pub ccs_power: Option<i32>,
    pub tesla_power: Option<i32>,
    pub j1772_power: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub station_image: Option<String>,
    pub image_url: Option<String>,
    pub network_type_id: Option<i32>,
    pub facility_type_id: Option<i32>,
}

impl UpdateStation {
    /// Fold the `image_url` alias into `station_image`.
    pub fn normalize(mut self) -> Self {
        if self.image_url.is_some() {
            self.station_image = self.image_url.take();
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.station_name.is_none()
            && self.street_address.is_none()
            && self.status.is_none()
            && self.online.is_none()
            && self.pricing.is_none()
            && self.access.is_none()
            && self.total_ports.is_none()
            && self.level.is_none()
            && self.chademo.is_none()
            && self.ccs.is_none()
            && self.tesla.is_none()
            && self.j1772.is_none()
            && self.nema1450.is_none()
            && self.nema515.is_none()
            && self.nema520.is_none()
            && self.chademo_power.is_none()
            && self.ccs_power.is_none()
            && self.tesla_power.is_none()
            && self.j1772_power.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
            && self.station_image.is_none()
            && self.image_url.is_none()
            && self.network_type_id.is_none()
            && self.facility_type_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> StationRow {
        StationRow {
            id: 42,
            station_name: "Downtown Fast Charge".to_string(),
            street_address: Some("1 Main St".to_string()),
            city_id: Some(3),
            network_type_id: Some(1),
            facility_type_id: None,
            station_image: None,
            status: Some("Active".to_string()),
            online: Some(true),
            pricing: None,
            access: None,
            total_ports: Some(6),
            level: Some("DC Fast".to_string()),
            chademo: Some(2),
            chademo_power: Some(50),
            j1772: Some(0),
            j1772_power: None,
            ccs: Some(4),
            ccs_power: Some(150),
            tesla: None,
            tesla_power: None,
            nema1450: Some(0),
            nema515: None,
            nema520: None,
            latitude: Some(40.0),
            longitude: Some(-74.0),
            created_at: None,
            updated_at: None,
            city_name: Some("Newark".to_string()),
            state_name: Some("New Jersey".to_string()),
            zipcode: None,
            network_name: Some("ChargeNet".to_string()),
            facility_name: None,
        }
    }

    #[test]
    fn connector_list_drops_zero_and_missing_counts() {
        let ports = connector_ports(&row());
        assert_eq!(
            ports,
            vec![
                ConnectorPort {
                    r#type: "CHAdeMO",
                    count: 2,
                    power_kw: Some(50)
                },
                ConnectorPort {
                    r#type: "CCS",
                    count: 4,
                    power_kw: Some(150)
                },
            ]
        );
    }

    #[test]
    fn detail_carries_lookup_names() {
        let detail = StationDetail::from(&row());
        assert_eq!(detail.identity.network.as_deref(), Some("ChargeNet"));
        assert_eq!(detail.location.state.as_deref(), Some("New Jersey"));
        assert!(detail.identity.facility.is_none());
    }

    #[test]
    fn image_url_alias_maps_to_station_image() {
        let update = UpdateStation {
            image_url: Some("https://cdn.example/abc".to_string()),
            ..Default::default()
        }
        .normalize();
        assert_eq!(
            update.station_image.as_deref(),
            Some("https://cdn.example/abc")
        );
        assert!(update.image_url.is_none());
        assert!(!update.is_empty());
    }

    #[test]
    fn empty_update_detected() {
        assert!(UpdateStation::default().is_empty());
    }
}
