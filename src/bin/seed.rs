//! Seed script for development — populates a fresh database with sample data.
//!
//! Usage: `cargo run --bin seed`
//!
//! Requires `DATABASE_URL` (reads .env). Idempotent: each section skips when
//! its table already has rows.

use sqlx::PgPool;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let db_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    // Run migrations first
    sqlx::migrate!("./migrations").run(&pool).await?;

    println!("=== Chargerzilla Admin Seed Script ===");

    seed_lookups(&pool).await?;
    seed_users(&pool).await?;
    seed_chargers(&pool).await?;
    seed_bookings(&pool).await?;
    seed_stations(&pool).await?;

    println!("\n=== Seed complete! ===");

    Ok(())
}

async fn seed_lookups(pool: &PgPool) -> anyhow::Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM countries")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        println!("[skip] Lookups already exist");
        return Ok(());
    }

    sqlx::query("INSERT INTO countries (country_name) VALUES ('United States')")
        .execute(pool)
        .await?;
    sqlx::query(
        "INSERT INTO states (state_name, country_id)
         SELECT s, 1 FROM unnest(ARRAY['New Jersey', 'New York', 'California']) AS s",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "INSERT INTO cities (city_name, state_id) VALUES
         ('Newark', 1), ('Jersey City', 1), ('Brooklyn', 2), ('San Jose', 3)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "INSERT INTO zipcodes (zipcode)
         SELECT z FROM unnest(ARRAY['07101', '07302', '11201', '95110']) AS z",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "INSERT INTO network_types (network_name) VALUES
         ('ChargePoint'), ('Electrify America'), ('EVgo')",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "INSERT INTO facility_types (facility_name) VALUES
         ('Shopping Center'), ('Hotel'), ('Parking Garage')",
    )
    .execute(pool)
    .await?;

    println!("[done] Created lookup tables");
    Ok(())
}

async fn seed_users(pool: &PgPool) -> anyhow::Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        println!("[skip] Users already exist ({count})");
        return Ok(());
    }

    let users = vec![
        ("Ada Host", "ada@chargerzilla.local", "host", true),
        ("Ben Guest", "ben@chargerzilla.local", "guest", true),
        ("Cleo Guest", "cleo@chargerzilla.local", "guest", false),
        ("Dana Admin", "dana@chargerzilla.local", "admin", true),
    ];
    for (name, email, role, verified) in users {
        sqlx::query(
            "INSERT INTO users (name, email, role, is_email_verified, active_status)
             VALUES ($1, $2, $3, $4, TRUE)",
        )
        .bind(name)
        .bind(email)
        .bind(role)
        .bind(verified)
        .execute(pool)
        .await?;
    }

    println!("[done] Created 4 sample users");
    Ok(())
}

async fn seed_chargers(pool: &PgPool) -> anyhow::Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM charger_listings")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        println!("[skip] Chargers already exist ({count})");
        return Ok(());
    }

    let host_id: i32 = sqlx::query_scalar("SELECT id FROM users WHERE role = 'host' LIMIT 1")
        .fetch_one(pool)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO charger_listings
            (id, title, address, connector_type, price_per_hour, published, created_by, amenities)
        VALUES
            ('chg_home_garage', 'Home Garage L2', '12 Volt St, Newark NJ', 'J1772', 2.50, TRUE, $1,
             ARRAY['WiFi', 'Covered']),
            ('chg_driveway', 'Driveway Tesla Connector', '99 Ohm Ave, Jersey City NJ', 'Tesla', 4.00, TRUE, $1,
             ARRAY['Well Lit']),
            ('chg_draft', 'Unfinished Listing', NULL, NULL, NULL, FALSE, $1, NULL)
        "#,
    )
    .bind(host_id)
    .execute(pool)
    .await?;
    sqlx::query("UPDATE charger_listings SET draft = TRUE WHERE id = 'chg_draft'")
        .execute(pool)
        .await?;

    println!("[done] Created 3 sample chargers");
    Ok(())
}

async fn seed_bookings(pool: &PgPool) -> anyhow::Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        println!("[skip] Bookings already exist ({count})");
        return Ok(());
    }

    let guest_id: i32 = sqlx::query_scalar("SELECT id FROM users WHERE role = 'guest' LIMIT 1")
        .fetch_one(pool)
        .await?;

    // Deliberately messy data: string amounts in JSON blobs and one
    // unparseable subtotal, matching what the booking flow writes.
    sqlx::query(
        r#"
        INSERT INTO bookings
            (id, charger_id, arrive_date, start_time, end_time, total_hours, subtotal,
             status, payment_status, charges, extras, created_by)
        VALUES
            ('bk_0001', 'chg_home_garage', CURRENT_DATE - 14, '09:00', '11:30', '2.5', '10.005',
             'Completed', 'funds-released',
             '{"finalCost": "9.50", "bookingFee": "0.50", "totalStripeFee": "0.41"}'::jsonb,
             '[{"name": "Car Wash", "price": "12.50", "flatFee": true}]'::jsonb, $1),
            ('bk_0002', 'chg_home_garage', CURRENT_DATE - 7, '14:00', '16:00', '2', '5.00',
             'Reserved', 'pending', NULL, NULL, $1),
            ('bk_0003', 'chg_driveway', CURRENT_DATE - 3, '08:00', '13:00', '5', '20.00',
             'Completed', 'captured',
             '{"finalCost": "19.00", "bookingFee": "1.00", "totalStripeFee": "0.88"}'::jsonb,
             NULL, $1),
            ('bk_0004', 'chg_driveway', CURRENT_DATE - 1, '10:00', '11:00', 'N/A', 'N/A',
             'CancelledByGuest', 'refunded', NULL, NULL, $1)
        "#,
    )
    .bind(guest_id)
    .execute(pool)
    .await?;

    println!("[done] Created 4 sample bookings");
    Ok(())
}

async fn seed_stations(pool: &PgPool) -> anyhow::Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM charging_stations")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        println!("[skip] Stations already exist ({count})");
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO charging_stations
            (station_name, street_address, city_id, network_type_id, facility_type_id,
             status, online, total_ports, level, chademo, chademo_power, ccs, ccs_power, j1772)
        VALUES
            ('Newark Mall Fast Charge', '1 Mall Dr', 1, 2, 1, 'Active', TRUE, 6, 'DC Fast', 2, 50, 4, 150, 0),
            ('Jersey City Garage L2', '50 Grove St', 2, 1, 3, 'Active', TRUE, 8, 'Level 2', 0, NULL, 0, NULL, 8),
            ('Brooklyn Hotel Chargers', '200 Atlantic Ave', 3, NULL, 2, 'Planned', FALSE, 4, 'Level 2', 0, NULL, 0, NULL, 4)
        "#,
    )
    .execute(pool)
    .await?;

    println!("[done] Created 3 sample stations");
    Ok(())
}
