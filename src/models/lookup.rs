//! Read-only lookup tables backing filters and select menus.

use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct City {
    pub id: i32,
    pub city_name: String,
    pub state_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StateRow {
    pub id: i32,
    pub state_name: String,
    pub country_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Country {
    pub id: i32,
    pub country_name: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Zipcode {
    pub id: i32,
    pub zipcode: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct NetworkType {
    pub id: i32,
    pub network_name: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FacilityType {
    pub id: i32,
    pub facility_name: String,
}

/// Host option for assignment dropdowns.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct HostOption {
    pub id: i32,
    pub name: String,
    pub email: String,
}
