pub mod booking;
pub mod charger;
pub mod lookup;
pub mod money;
pub mod pagination;
pub mod station;
pub mod user;
