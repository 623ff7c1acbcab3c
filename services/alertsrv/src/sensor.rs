//! Sensor Store - batched environmental readings uploaded by the device

use crate::error::{AlertSrvError, Result};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::debug;

/// Rows returned when no limit is given
pub const DEFAULT_LIST_LIMIT: u32 = 100;

/// Upper bound for a single listing
pub const MAX_LIST_LIMIT: u32 = 1000;

const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS sensor_data (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        ppm REAL NOT NULL,
        temperature REAL NOT NULL,
        humidity REAL NOT NULL,
        voltage REAL NOT NULL,
        time INTEGER NOT NULL
    )
"#;

const CREATE_INDEX_SQL: &str =
    "CREATE INDEX IF NOT EXISTS idx_sensor_data_time ON sensor_data (time DESC, id DESC)";

/// One reading as uploaded by the device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub ppm: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub voltage: f64,
    /// Device timestamp (seconds since epoch)
    pub time: i64,
}

impl SensorReading {
    fn validate(&self) -> Result<()> {
        let fields = [
            ("ppm", self.ppm),
            ("temperature", self.temperature),
            ("humidity", self.humidity),
            ("voltage", self.voltage),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(AlertSrvError::validation(format!(
                    "{} must be a finite number",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Stored reading with its row id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSensorReading {
    pub id: i64,
    #[serde(flatten)]
    pub reading: SensorReading,
}

fn hydrate_reading(row: &SqliteRow) -> Result<StoredSensorReading> {
    Ok(StoredSensorReading {
        id: row.try_get("id")?,
        reading: SensorReading {
            ppm: row.try_get("ppm")?,
            temperature: row.try_get("temperature")?,
            humidity: row.try_get("humidity")?,
            voltage: row.try_get("voltage")?,
            time: row.try_get("time")?,
        },
    })
}

/// Clamp a requested listing size into `1..=MAX_LIST_LIMIT`
pub fn clamp_limit(limit: Option<u32>) -> u32 {
    limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT)
}

#[derive(Clone)]
pub struct SensorStore {
    pool: SqlitePool,
}

impl SensorStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE_SQL).execute(&self.pool).await?;
        sqlx::query(CREATE_INDEX_SQL).execute(&self.pool).await?;
        debug!("sensor_data table ready");
        Ok(())
    }

    /// Insert a batch in one transaction, all or nothing
    pub async fn insert_batch(&self, readings: &[SensorReading]) -> Result<usize> {
        if readings.is_empty() {
            return Ok(0);
        }
        for reading in readings {
            reading.validate()?;
        }

        let mut tx = self.pool.begin().await?;
        for reading in readings {
            sqlx::query(
                r#"
                INSERT INTO sensor_data (ppm, temperature, humidity, voltage, time)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(reading.ppm)
            .bind(reading.temperature)
            .bind(reading.humidity)
            .bind(reading.voltage)
            .bind(reading.time)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        debug!("Stored {} sensor readings", readings.len());
        Ok(readings.len())
    }

    /// Newest readings first
    pub async fn list_recent(&self, limit: Option<u32>) -> Result<Vec<StoredSensorReading>> {
        let rows = sqlx::query(
            r#"
            SELECT id, ppm, temperature, humidity, voltage, time
            FROM sensor_data
            ORDER BY time DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(i64::from(clamp_limit(limit)))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(hydrate_reading).collect()
    }
}
