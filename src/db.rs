use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, postgres::PgPoolOptions};
use uuid::Uuid;

use crate::sensor::{Device, NewReading, Reading};

/// Channel notified by the `sensor_data` insert trigger. The payload is the
/// id of the new row.
pub const READING_INSERTED_CHANNEL: &str = "sensor_data_inserted";

pub const FETCH_READINGS_LIMIT: i64 = 100;

#[derive(Debug, sqlx::FromRow)]
struct ReadingRow {
    id: Uuid,
    device_id: String,
    timestamp: DateTime<Utc>,
    co2: Option<f64>,
    pm25: Option<f64>,
    co: Option<f64>,
    temperature: Option<f64>,
    humidity: Option<f64>,
}

impl From<ReadingRow> for Reading {
    fn from(row: ReadingRow) -> Self {
        Reading {
            id: row.id,
            device_id: row.device_id,
            timestamp: row.timestamp,
            co2: row.co2,
            pm25: row.pm25,
            co: row.co,
            temperature: row.temperature,
            humidity: row.humidity,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DeviceRow {
    id: Uuid,
    device_id: String,
    name: String,
    location: String,
    status: String,
    battery_level: Option<f64>,
    firmware_version: Option<String>,
    last_transmission: Option<DateTime<Utc>>,
}

impl TryFrom<DeviceRow> for Device {
    type Error = anyhow::Error;

    fn try_from(row: DeviceRow) -> Result<Self> {
        let status = row
            .status
            .parse()
            .with_context(|| format!("invalid status for device {}", row.device_id))?;

        Ok(Device {
            id: row.id,
            device_id: row.device_id,
            name: row.name,
            location: row.location,
            status,
            battery_level: row.battery_level,
            firmware_version: row.firmware_version,
            last_transmission: row.last_transmission,
        })
    }
}

pub async fn new_pool(database_url: &str) -> Result<PgPool> {
    PgPoolOptions::new()
        .connect(database_url)
        .await
        .context("failed to connect to database")
}

pub async fn bulk_insert_readings(pool: &PgPool, readings: &[NewReading]) -> Result<()> {
    if readings.is_empty() {
        return Ok(());
    }

    let device_ids: Vec<&str> = readings.iter().map(|r| r.device_id.as_str()).collect();
    let timestamps: Vec<DateTime<Utc>> = readings.iter().map(|r| r.timestamp).collect();
    let co2s: Vec<Option<f64>> = readings.iter().map(|r| r.co2).collect();
    let pm25s: Vec<Option<f64>> = readings.iter().map(|r| r.pm25).collect();
    let cos: Vec<Option<f64>> = readings.iter().map(|r| r.co).collect();
    let temperatures: Vec<Option<f64>> = readings.iter().map(|r| r.temperature).collect();
    let humidities: Vec<Option<f64>> = readings.iter().map(|r| r.humidity).collect();

    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    sqlx::query(
        r#"
        INSERT INTO sensor_data (device_id, "timestamp", co2, pm25, co, temperature, humidity)
        SELECT * FROM UNNEST($1::TEXT[], $2::TIMESTAMPTZ[], $3::FLOAT8[], $4::FLOAT8[], $5::FLOAT8[], $6::FLOAT8[], $7::FLOAT8[])
        ON CONFLICT (device_id, "timestamp") DO NOTHING
        "#,
    )
    .bind(&device_ids)
    .bind(&timestamps)
    .bind(&co2s)
    .bind(&pm25s)
    .bind(&cos)
    .bind(&temperatures)
    .bind(&humidities)
    .execute(&mut *tx)
    .await
    .context("failed to execute bulk insert query")?;

    tx.commit().await.context("failed to commit transaction")?;

    Ok(())
}

/// Most recent first, at most [`FETCH_READINGS_LIMIT`] rows.
pub async fn fetch_readings(pool: &PgPool, device_id: Option<&str>) -> Result<Vec<Reading>> {
    let rows: Vec<ReadingRow> = sqlx::query_as(
        r#"
        SELECT id, device_id, "timestamp", co2, pm25, co, temperature, humidity
        FROM sensor_data
        WHERE $1::TEXT IS NULL OR device_id = $1
        ORDER BY "timestamp" DESC
        LIMIT $2
        "#,
    )
    .bind(device_id)
    .bind(FETCH_READINGS_LIMIT)
    .fetch_all(pool)
    .await
    .context("failed to fetch sensor readings")?;

    Ok(rows.into_iter().map(Reading::from).collect())
}

pub async fn fetch_reading(pool: &PgPool, id: Uuid) -> Result<Option<Reading>> {
    let row: Option<ReadingRow> = sqlx::query_as(
        r#"
        SELECT id, device_id, "timestamp", co2, pm25, co, temperature, humidity
        FROM sensor_data
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("failed to fetch sensor reading {id}"))?;

    Ok(row.map(Reading::from))
}

pub async fn fetch_devices(pool: &PgPool, user_id: Uuid) -> Result<Vec<Device>> {
    let rows: Vec<DeviceRow> = sqlx::query_as(
        r#"
        SELECT id, device_id, name, location, status, battery_level, firmware_version, last_transmission
        FROM devices
        WHERE user_id = $1
        ORDER BY name
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("failed to fetch devices")?;

    rows.into_iter().map(Device::try_from).collect()
}
