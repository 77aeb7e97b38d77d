//! Admin metadata: lookup tables plus static enumerations, behind a TTL cache.
//!
//! Metadata rarely changes but every dashboard page requests it, so the
//! assembled payload is cached in process for a few minutes. The cache is
//! single-flight: the refresh runs under the lock, so concurrent cold hits
//! produce exactly one database round trip.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use sqlx::PgPool;
use tokio::sync::Mutex;

use crate::errors::AppError;
use crate::models::lookup::{
    City, Country, FacilityType, HostOption, NetworkType, StateRow, Zipcode,
};

/// How long a cached metadata payload stays fresh.
pub const METADATA_CACHE_TTL: Duration = Duration::from_secs(300);

/// Caps on the larger lookup tables inside the cached payload. The full
/// zipcode table is reachable through the dedicated search endpoint.
const CITIES_CAP: i64 = 500;
const ZIPCODES_CAP: i64 = 50;

/// Connector types offered in dashboard dropdowns.
pub const CONNECTOR_TYPES: [&str; 5] = ["CHAdeMO", "J1772", "CCS", "Tesla", "NEMA"];

/// Booking lifecycle statuses.
pub const BOOKING_STATUSES: [&str; 5] = [
    "Reserved",
    "CancelledByHost",
    "CancelledByGuest",
    "Waiting",
    "Completed",
];

/// Payment statuses as written by the booking flow.
pub const PAYMENT_STATUSES: [&str; 5] =
    ["pending", "captured", "funds-released", "cancelled", "refunded"];

/// Public station operational statuses.
pub const STATION_STATUSES: [&str; 3] = ["Active", "Planned", "Decommissioned"];

/// Private charger listing states derived from its flag columns.
pub const CHARGER_STATUSES: [&str; 4] = ["published", "draft", "disabled", "deleted"];

/// Platform roles.
pub const USER_ROLES: [&str; 3] = ["guest", "host", "admin"];

/// Assembled metadata payload served to the dashboard.
#[derive(Debug, Serialize)]
pub struct AdminMetadata {
    pub cities: Vec<City>,
    pub states: Vec<StateRow>,
    pub countries: Vec<Country>,
    pub network_types: Vec<NetworkType>,
    pub facility_types: Vec<FacilityType>,
    pub zipcodes: Vec<Zipcode>,
    pub hosts: Vec<HostOption>,
    pub connector_types: Vec<&'static str>,
    pub booking_statuses: Vec<&'static str>,
    pub payment_statuses: Vec<&'static str>,
    pub station_statuses: Vec<&'static str>,
    pub charger_statuses: Vec<&'static str>,
    pub user_roles: Vec<&'static str>,
}

struct CacheEntry {
    payload: Arc<AdminMetadata>,
    fetched_at: Instant,
}

/// TTL cache around the metadata payload.
#[derive(Default)]
pub struct MetadataCache {
    entry: Mutex<Option<CacheEntry>>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached payload if fresh, otherwise run `refresh` and cache
    /// its result. The boolean reports whether the response was served from
    /// cache. The lock is held across the refresh so a stampede of cold
    /// requests still refreshes once.
    pub async fn get_or_refresh<F, Fut>(
        &self,
        ttl: Duration,
        refresh: F,
    ) -> Result<(Arc<AdminMetadata>, bool), AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AdminMetadata, AppError>>,
    {
        let mut guard = self.entry.lock().await;

        if let Some(entry) = guard.as_ref() {
            if entry.fetched_at.elapsed() < ttl {
                return Ok((Arc::clone(&entry.payload), true));
            }
        }

        let payload = Arc::new(refresh().await?);
        *guard = Some(CacheEntry {
            payload: Arc::clone(&payload),
            fetched_at: Instant::now(),
        });
        Ok((payload, false))
    }

    /// Drop the cached payload so the next request refetches.
    pub async fn invalidate(&self) {
        *self.entry.lock().await = None;
    }
}

/// Assemble the metadata payload from lookups and static enumerations.
pub async fn fetch_metadata(pool: &PgPool) -> Result<AdminMetadata, AppError> {
    let (cities, states, countries, network_types, facility_types, zipcodes, hosts) =
        tokio::try_join!(
            fetch_cities(pool),
            fetch_states(pool),
            fetch_countries(pool),
            fetch_network_types(pool),
            fetch_facility_types(pool),
            list_zipcodes(pool, None, ZIPCODES_CAP),
            fetch_hosts(pool),
        )?;

    Ok(AdminMetadata {
        cities,
        states,
        countries,
        network_types,
        facility_types,
        zipcodes,
        hosts,
        connector_types: CONNECTOR_TYPES.to_vec(),
        booking_statuses: BOOKING_STATUSES.to_vec(),
        payment_statuses: PAYMENT_STATUSES.to_vec(),
        station_statuses: STATION_STATUSES.to_vec(),
        charger_statuses: CHARGER_STATUSES.to_vec(),
        user_roles: USER_ROLES.to_vec(),
    })
}

async fn fetch_cities(pool: &PgPool) -> Result<Vec<City>, AppError> {
    let rows = sqlx::query_as::<_, City>(
        "SELECT id, city_name, state_id FROM cities ORDER BY city_name ASC LIMIT $1",
    )
    .bind(CITIES_CAP)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

async fn fetch_states(pool: &PgPool) -> Result<Vec<StateRow>, AppError> {
    let rows = sqlx::query_as::<_, StateRow>(
        "SELECT id, state_name, country_id FROM states ORDER BY state_name ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

async fn fetch_countries(pool: &PgPool) -> Result<Vec<Country>, AppError> {
    let rows = sqlx::query_as::<_, Country>(
        "SELECT id, country_name FROM countries ORDER BY country_name ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

async fn fetch_network_types(pool: &PgPool) -> Result<Vec<NetworkType>, AppError> {
    let rows = sqlx::query_as::<_, NetworkType>(
        "SELECT id, network_name FROM network_types ORDER BY network_name ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

async fn fetch_facility_types(pool: &PgPool) -> Result<Vec<FacilityType>, AppError> {
    let rows = sqlx::query_as::<_, FacilityType>(
        "SELECT id, facility_name FROM facility_types ORDER BY facility_name ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Users who currently have at least one live listing.
async fn fetch_hosts(pool: &PgPool) -> Result<Vec<HostOption>, AppError> {
    let rows = sqlx::query_as::<_, HostOption>(
        r#"
        SELECT DISTINCT u.id, u.name, u.email
        FROM users u
        JOIN charger_listings c ON c.created_by = u.id AND c.deleted = FALSE
        ORDER BY u.name ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Zipcodes lookup, paged separately from the cached payload: the table is
/// large enough that it would dominate the cache for a dropdown almost nobody
/// opens.
pub async fn list_zipcodes(
    pool: &PgPool,
    search: Option<&str>,
    limit: i64,
) -> Result<Vec<Zipcode>, AppError> {
    let rows = sqlx::query_as::<_, Zipcode>(
        r#"
        SELECT id, zipcode FROM zipcodes
        WHERE $1::text IS NULL OR zipcode LIKE $1 || '%'
        ORDER BY zipcode ASC
        LIMIT $2
        "#,
    )
    .bind(search)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn empty_metadata() -> AdminMetadata {
        AdminMetadata {
            cities: vec![],
            states: vec![],
            countries: vec![],
            network_types: vec![],
            facility_types: vec![],
            zipcodes: vec![],
            hosts: vec![],
            connector_types: CONNECTOR_TYPES.to_vec(),
            booking_statuses: BOOKING_STATUSES.to_vec(),
            payment_statuses: PAYMENT_STATUSES.to_vec(),
            station_statuses: STATION_STATUSES.to_vec(),
            charger_statuses: CHARGER_STATUSES.to_vec(),
            user_roles: USER_ROLES.to_vec(),
        }
    }

    #[tokio::test]
    async fn second_hit_within_ttl_is_served_from_cache() {
        let cache = MetadataCache::new();
        let calls = AtomicU32::new(0);

        let (_, cached) = cache
            .get_or_refresh(Duration::from_secs(60), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(empty_metadata()) }
            })
            .await
            .unwrap();
        assert!(!cached);

        let (_, cached) = cache
            .get_or_refresh(Duration::from_secs(60), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(empty_metadata()) }
            })
            .await
            .unwrap();
        assert!(cached);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_ttl_forces_refresh() {
        let cache = MetadataCache::new();
        let calls = AtomicU32::new(0);

        for _ in 0..2 {
            let (_, cached) = cache
                .get_or_refresh(Duration::ZERO, || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Ok(empty_metadata()) }
                })
                .await
                .unwrap();
            assert!(!cached);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn concurrent_cold_misses_coalesce_into_one_refresh() {
        let cache = Arc::new(MetadataCache::new());
        let calls = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_refresh(Duration::from_secs(60), move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        // Slow fetch, so every other task arrives while the
                        // first refresh is still in flight.
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok(empty_metadata())
                    })
                    .await
            }));
        }

        let mut cache_hits = 0;
        for handle in handles {
            let (_, cached) = handle.await.unwrap().unwrap();
            if cached {
                cache_hits += 1;
            }
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache_hits, 7);
    }

    #[tokio::test]
    async fn failed_refresh_leaves_cache_empty() {
        let cache = MetadataCache::new();

        let result = cache
            .get_or_refresh(Duration::from_secs(60), || async {
                Err(AppError::Internal("lookup query failed".to_string()))
            })
            .await;
        assert!(result.is_err());

        // Next call refreshes again instead of serving a poisoned entry.
        let (_, cached) = cache
            .get_or_refresh(Duration::from_secs(60), || async { Ok(empty_metadata()) })
            .await
            .unwrap();
        assert!(!cached);
    }

    #[tokio::test]
    async fn invalidate_clears_entry() {
        let cache = MetadataCache::new();
        cache
            .get_or_refresh(Duration::from_secs(60), || async { Ok(empty_metadata()) })
            .await
            .unwrap();
        cache.invalidate().await;

        let (_, cached) = cache
            .get_or_refresh(Duration::from_secs(60), || async { Ok(empty_metadata()) })
            .await
            .unwrap();
        assert!(!cached);
    }
}
