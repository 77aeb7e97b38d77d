//! Public charging station service: filtered listing, detail, updates, and
//! image removal.

use serde::Deserialize;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::pagination::{PagedResult, Pagination};
use crate::models::station::{StationDetail, StationRow, StationSummary, UpdateStation};
use crate::services::cdn::CloudflareImages;

/// Filters for listing stations.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct StationFilters {
    pub city_id: Option<i32>,
    pub network_type_id: Option<i32>,
    pub facility_type_id: Option<i32>,
    pub status: Option<String>,
    pub online: Option<bool>,
    pub level: Option<String>,
    /// Restrict to stations with at least one port of this connector type.
    pub connector: Option<ConnectorFilter>,
    pub search: Option<String>,
}

/// Connector types accepted by the list filter. Deserializing the enum keeps
/// the column name out of user hands.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorFilter {
    Chademo,
    J1772,
    Ccs,
    Tesla,
}

impl ConnectorFilter {
    fn column(self) -> &'static str {
        match self {
            Self::Chademo => "chademo",
            Self::J1772 => "j1772",
            Self::Ccs => "ccs",
            Self::Tesla => "tesla",
        }
    }
}

const SELECT_COLUMNS: &str = "s.id, s.station_name, s.street_address, s.city_id, \
     s.network_type_id, s.facility_type_id, s.station_image, s.status, s.online, \
     s.pricing, s.access, s.total_ports, s.level, \
     s.chademo, s.chademo_power, s.j1772, s.j1772_power, \
     s.ccs, s.ccs_power, s.tesla, s.tesla_power, \
     s.nema1450, s.nema515, s.nema520, \
     s.latitude, s.longitude, s.created_at, s.updated_at, \
     ci.city_name, st.state_name, z.zipcode, \
     n.network_name, f.facility_name";

const FROM_JOINED: &str = "FROM charging_stations s \
     LEFT JOIN cities ci ON ci.id = s.city_id \
     LEFT JOIN states st ON st.id = ci.state_id \
     LEFT JOIN zipcodes z ON z.id = s.zipcode_id \
     LEFT JOIN network_types n ON n.id = s.network_type_id \
     LEFT JOIN facility_types f ON f.id = s.facility_type_id";

/// List stations with lookup names resolved.
pub async fn list(
    pool: &PgPool,
    filters: &StationFilters,
    pagination: &Pagination,
) -> Result<PagedResult<StationSummary>, AppError> {
    let mut conditions: Vec<String> = Vec::new();
    let mut param_index = 0u32;

    if filters.city_id.is_some() {
        param_index += 1;
        conditions.push(format!("s.city_id = ${param_index}"));
    }
    if filters.network_type_id.is_some() {
        param_index += 1;
        conditions.push(format!("s.network_type_id = ${param_index}"));
    }
    if filters.facility_type_id.is_some() {
        param_index += 1;
        conditions.push(format!("s.facility_type_id = ${param_index}"));
    }
    if filters.status.is_some() {
        param_index += 1;
        conditions.push(format!("s.status = ${param_index}"));
    }
    if filters.online.is_some() {
        param_index += 1;
        conditions.push(format!("s.online = ${param_index}"));
    }
    if filters.level.is_some() {
        param_index += 1;
        conditions.push(format!("s.level = ${param_index}"));
    }
    if let Some(connector) = filters.connector {
        conditions.push(format!("s.{} > 0", connector.column()));
    }
    if filters.search.is_some() {
        param_index += 1;
        conditions.push(format!(
            "(s.station_name ILIKE ${param_index} OR s.street_address ILIKE ${param_index} \
             OR ci.city_name ILIKE ${param_index})"
        ));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) {FROM_JOINED} {where_clause}");
    let data_sql = format!(
        "SELECT {SELECT_COLUMNS} {FROM_JOINED} {where_clause} \
         ORDER BY s.station_name ASC, s.id ASC LIMIT {} OFFSET {}",
        pagination.limit(),
        pagination.offset()
    );

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    let mut data_query = sqlx::query_as::<_, StationRow>(&data_sql);

    macro_rules! bind_both {
        ($val:expr) => {
            count_query = count_query.bind($val);
            data_query = data_query.bind($val);
        };
    }

    if let Some(city_id) = filters.city_id {
        bind_both!(city_id);
    }
    if let Some(network_id) = filters.network_type_id {
        bind_both!(network_id);
    }
    if let Some(facility_id) = filters.facility_type_id {
        bind_both!(facility_id);
    }
    if let Some(ref status) = filters.status {
        bind_both!(status);
    }
    if let Some(online) = filters.online {
        bind_both!(online);
    }
    if let Some(ref level) = filters.level {
        bind_both!(level);
    }
    if let Some(ref search) = filters.search {
        let pattern = format!("%{search}%");
        count_query = count_query.bind(pattern.clone());
        data_query = data_query.bind(pattern);
    }

    let total = count_query.fetch_one(pool).await?;
    let rows = data_query.fetch_all(pool).await?;
    let items = rows.iter().map(StationSummary::from).collect();

    Ok(PagedResult::new(items, total, pagination))
}

/// Fetch one station with its lookup names.
pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<StationDetail, AppError> {
    let sql = format!("SELECT {SELECT_COLUMNS} {FROM_JOINED} WHERE s.id = $1");
    let row = sqlx::query_as::<_, StationRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Station {id} not found")))?;
    Ok(StationDetail::from(&row))
}

/// Apply an admin update with COALESCE semantics per column.
pub async fn update(
    pool: &PgPool,
    id: i32,
    update: &UpdateStation,
) -> Result<StationDetail, AppError> {
    if update.is_empty() {
        return Err(AppError::Validation(
            "Update body contains no recognized fields".to_string(),
        ));
    }

    let result = sqlx::query(
        r#"
        UPDATE charging_stations SET
            station_name = COALESCE($2, station_name),
            street_address = COALESCE($3, street_address),
            status = COALESCE($4, status),
            online = COALESCE($5, online),
            pricing = COALESCE($6, pricing),
            access = COALESCE($7, access),
            total_ports = COALESCE($8, total_ports),
            level = COALESCE($9, level),
            chademo = COALESCE($10, chademo),
            ccs = COALESCE($11, ccs),
            tesla = COALESCE($12, tesla),
            j1772 = COALESCE($13, j1772),
            nema1450 = COALESCE($14, nema1450),
            nema515 = COALESCE($15, nema515),
            nema520 = COALESCE($16, nema520),
            chademo_power = COALESCE($17, chademo_power),
            ccs_power = COALESCE($18, ccs_power),
            tesla_power = COALESCE($19, tesla_power),
            j1772_power = COALESCE($20, j1772_power),
            latitude = COALESCE($21, latitude),
            longitude = COALESCE($22, longitude),
            station_image = COALESCE($23, station_image),
            network_type_id = COALESCE($24, network_type_id),
            facility_type_id = COALESCE($25, facility_type_id),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(&update.station_name)
    .bind(&update.street_address)
    .bind(&update.status)
    .bind(update.online)
    .bind(&update.pricing)
    .bind(&update.access)
    .bind(update.total_ports)
    .bind(&update.level)
    .bind(update.chademo)
    .bind(update.ccs)
    .bind(update.tesla)
    .bind(update.j1772)
    .bind(update.nema1450)
    .bind(update.nema515)
    .bind(update.nema520)
    .bind(update.chademo_power)
    .bind(update.ccs_power)
    .bind(update.tesla_power)
    .bind(update.j1772_power)
    .bind(update.latitude)
    .bind(update.longitude)
    .bind(&update.station_image)
    .bind(update.network_type_id)
    .bind(update.facility_type_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Station {id} not found")));
    }

    find_by_id(pool, id).await
}

/// Clear the station's image and purge its CDN copy.
pub async fn clear_image(
    pool: &PgPool,
    cdn: &CloudflareImages,
    id: i32,
) -> Result<StationDetail, AppError> {
    let image = sqlx::query_scalar::<_, Option<String>>(
        "SELECT station_image FROM charging_stations WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Station {id} not found")))?;

    sqlx::query("UPDATE charging_stations SET station_image = NULL, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    // Purge is best effort: the column is already cleared, so a stale cached
    // copy on the edge is the worst case, not a failed mutation.
    if let Some(url) = image {
        if let Err(err) = cdn.purge_cache(&[url]).await {
            tracing::warn!(station_id = id, error = %err, "CDN purge failed after image clear");
        }
    }

    find_by_id(pool, id).await
}
