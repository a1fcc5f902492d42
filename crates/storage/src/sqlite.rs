//! SQLite Repository Implementation

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::models::{Measurement, NewMeasurement, NewSensor, PageRequest, Sensor};
use crate::repository::{MeasurementRepository, SensorRepository};
use crate::StorageError;

const SCHEMA: [&str; 4] = [
    r#"
    CREATE TABLE IF NOT EXISTS sensors (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        location TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS measurements (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp TEXT NOT NULL,
        value REAL NOT NULL,
        sensor_id INTEGER NOT NULL REFERENCES sensors (id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_measurements_sensor ON measurements (sensor_id)",
    "CREATE INDEX IF NOT EXISTS idx_measurements_timestamp ON measurements (timestamp)",
];

const SELECT_MEASUREMENTS: &str = r#"
    SELECT m.id, m.timestamp, m.value, m.sensor_id,
           s.name AS sensor_name, s.location AS sensor_location
    FROM measurements m
    LEFT JOIN sensors s ON s.id = m.sensor_id
"#;

#[derive(sqlx::FromRow)]
struct MeasurementRow {
    id: i64,
    timestamp: NaiveDateTime,
    value: f64,
    sensor_id: i64,
    sensor_name: Option<String>,
    sensor_location: Option<String>,
}

impl From<MeasurementRow> for Measurement {
    fn from(row: MeasurementRow) -> Self {
        let sensor = match (row.sensor_name, row.sensor_location) {
            (Some(name), Some(location)) => Some(Sensor {
                id: row.sensor_id,
                name,
                location,
            }),
            _ => None,
        };

        Self {
            id: row.id,
            timestamp: row.timestamp,
            value: row.value,
            sensor,
        }
    }
}

/// Repository backed by a SQLite connection pool
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Connect to `url` and create the schema if needed.
    ///
    /// In-memory databases are pinned to a single long-lived connection so
    /// every query sees the same data.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StorageError::InvalidUrl(format!("{url}: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true);

        let in_memory = url.contains(":memory:");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(Option::<Duration>::None)
                .max_lifetime(Option::<Duration>::None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };

        let pool = pool_options.connect_with(options).await?;
        let repository = Self { pool };
        repository.migrate().await?;

        info!(url, in_memory, "Connected to SQLite repository");
        Ok(repository)
    }

    /// Fresh private in-memory database
    pub async fn in_memory() -> Result<Self, StorageError> {
        Self::connect("sqlite::memory:", 1).await
    }

    async fn migrate(&self) -> Result<(), StorageError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn fetch_measurements(
        &self,
        filter: &str,
        location: Option<&str>,
        range: Option<(NaiveDateTime, NaiveDateTime)>,
    ) -> Result<Vec<Measurement>, StorageError> {
        let sql = format!("{SELECT_MEASUREMENTS} {filter} ORDER BY m.id");
        let mut query = sqlx::query_as::<_, MeasurementRow>(&sql);
        if let Some(location) = location {
            query = query.bind(location);
        }
        if let Some((from, to)) = range {
            query = query.bind(from).bind(to);
        }

        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Measurement::from).collect())
    }
}

#[async_trait]
impl MeasurementRepository for SqliteRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Measurement>, StorageError> {
        let sql = format!("{SELECT_MEASUREMENTS} WHERE m.id = ?");
        let row = sqlx::query_as::<_, MeasurementRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Measurement::from))
    }

    async fn find_all(&self) -> Result<Vec<Measurement>, StorageError> {
        self.fetch_measurements("", None, None).await
    }

    async fn save(&self, measurement: NewMeasurement) -> Result<i64, StorageError> {
        let mut tx = self.pool.begin().await?;

        let id = match measurement.id {
            Some(id) => {
                sqlx::query(
                    r#"
                    INSERT INTO measurements (id, timestamp, value, sensor_id)
                    VALUES (?, ?, ?, ?)
                    ON CONFLICT (id) DO UPDATE SET
                        timestamp = excluded.timestamp,
                        value = excluded.value,
                        sensor_id = excluded.sensor_id
                    "#,
                )
                .bind(id)
                .bind(measurement.timestamp)
                .bind(measurement.value)
                .bind(measurement.sensor_id)
                .execute(&mut *tx)
                .await?;
                id
            }
            None => sqlx::query(
                "INSERT INTO measurements (timestamp, value, sensor_id) VALUES (?, ?, ?)",
            )
            .bind(measurement.timestamp)
            .bind(measurement.value)
            .bind(measurement.sensor_id)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid(),
        };

        tx.commit().await?;
        debug!("Saved measurement with ID {}", id);

        Ok(id)
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, StorageError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM measurements WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_sensor(&self, sensor_id: i64) -> Result<Vec<Measurement>, StorageError> {
        let sql = format!("{SELECT_MEASUREMENTS} WHERE m.sensor_id = ? ORDER BY m.id");
        let rows = sqlx::query_as::<_, MeasurementRow>(&sql)
            .bind(sensor_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Measurement::from).collect())
    }

    async fn find_by_location(&self, location: &str) -> Result<Vec<Measurement>, StorageError> {
        self.fetch_measurements("WHERE s.location = ?", Some(location), None)
            .await
    }

    async fn find_by_location_between(
        &self,
        location: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<Measurement>, StorageError> {
        self.fetch_measurements(
            "WHERE s.location = ? AND m.timestamp BETWEEN ? AND ?",
            Some(location),
            Some((from, to)),
        )
        .await
    }

    async fn find_page(&self, page: PageRequest) -> Result<Vec<Measurement>, StorageError> {
        let order = if page.sort_by_date {
            "m.timestamp, m.id"
        } else {
            "m.id"
        };
        let sql = format!("{SELECT_MEASUREMENTS} ORDER BY {order} LIMIT ? OFFSET ?");
        let rows = sqlx::query_as::<_, MeasurementRow>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Measurement::from).collect())
    }

    async fn count(&self) -> Result<i64, StorageError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM measurements")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl SensorRepository for SqliteRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Sensor>, StorageError> {
        let sensor = sqlx::query_as::<_, Sensor>("SELECT id, name, location FROM sensors WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(sensor)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Sensor>, StorageError> {
        let sensor =
            sqlx::query_as::<_, Sensor>("SELECT id, name, location FROM sensors WHERE name = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;
        Ok(sensor)
    }

    async fn save(&self, sensor: NewSensor) -> Result<i64, StorageError> {
        let mut tx = self.pool.begin().await?;
        let id = sqlx::query("INSERT INTO sensors (name, location) VALUES (?, ?)")
            .bind(&sensor.name)
            .bind(&sensor.location)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();
        tx.commit().await?;

        debug!("Registered sensor {} with ID {}", sensor.name, id);
        Ok(id)
    }

    async fn count(&self) -> Result<i64, StorageError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sensors")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
