//! Business logic layer: one module per resource plus cross-cutting services.

pub mod analytics;
pub mod booking;
pub mod cdn;
pub mod charger;
pub mod dashboard;
pub mod metadata;
pub mod station;
pub mod user;
