//! Postgres-backed plant watering log.
//!
//! Single-statement, single-round-trip operations: list every plant with its
//! schedule position, and stamp one plant as watered. No transactions, no
//! retries; failures are terminal for the request that triggered them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::Result;

/// One row of the watering log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PlantRecord {
    /// Row id.
    pub id: i32,
    /// Unique plant name.
    pub plant_name: String,
    /// When the plant was last watered.
    pub watered_at: DateTime<Utc>,
    /// Days between waterings.
    pub watering_interval: i32,
}

/// A record plus its position in the watering schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantStatus {
    /// Row id.
    pub id: i32,
    /// Unique plant name.
    pub plant_name: String,
    /// When the plant was last watered.
    pub watered_at: DateTime<Utc>,
    /// Days between waterings.
    pub watering_interval: i32,
    /// Whole days until the next scheduled watering; negative when overdue.
    pub days_until_next_watering: i64,
}

/// Whole days until `record` is due for watering, measured at `now`.
pub fn days_until_next_watering(record: &PlantRecord, now: DateTime<Utc>) -> i64 {
    let elapsed = (now - record.watered_at).num_days();
    i64::from(record.watering_interval) - elapsed
}

/// Handle to the watering-log table.
#[derive(Clone)]
pub struct PlantStore {
    pool: PgPool,
}

impl PlantStore {
    /// Connect a small pool to the given Postgres URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new().max_connections(4).connect(url).await?;
        info!("plant store connected");
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Every plant with its schedule position, ordered by name.
    pub async fn list_statuses(&self) -> Result<Vec<PlantStatus>> {
        let records: Vec<PlantRecord> = sqlx::query_as(
            "SELECT id, plant_name, watered_at, watering_interval \
             FROM water_plant_log \
             ORDER BY plant_name",
        )
        .fetch_all(&self.pool)
        .await?;

        let now = Utc::now();
        Ok(records
            .into_iter()
            .map(|record| {
                let days = days_until_next_watering(&record, now);
                PlantStatus {
                    id: record.id,
                    plant_name: record.plant_name,
                    watered_at: record.watered_at,
                    watering_interval: record.watering_interval,
                    days_until_next_watering: days,
                }
            })
            .collect())
    }

    /// Stamp the named plant as watered now.
    ///
    /// Returns the updated row, or `None` when no plant matches the name.
    pub async fn mark_watered(&self, plant_name: &str) -> Result<Option<PlantRecord>> {
        let record = sqlx::query_as(
            "UPDATE water_plant_log \
             SET watered_at = NOW() \
             WHERE plant_name = $1 \
             RETURNING id, plant_name, watered_at, watering_interval",
        )
        .bind(plant_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(watered_days_ago: i64, interval: i32) -> (PlantRecord, DateTime<Utc>) {
        let now = Utc::now();
        let record = PlantRecord {
            id: 1,
            plant_name: "Basil".to_string(),
            watered_at: now - Duration::days(watered_days_ago),
            watering_interval: interval,
        };
        (record, now)
    }

    #[test]
    fn test_days_until_for_freshly_watered() {
        let (record, now) = record(0, 7);
        assert_eq!(days_until_next_watering(&record, now), 7);
    }

    #[test]
    fn test_days_until_counts_down() {
        let (record, now) = record(3, 7);
        assert_eq!(days_until_next_watering(&record, now), 4);
    }

    #[test]
    fn test_overdue_goes_negative() {
        let (record, now) = record(10, 7);
        assert_eq!(days_until_next_watering(&record, now), -3);
    }

    #[test]
    fn test_partial_days_do_not_count() {
        let now = Utc::now();
        let record = PlantRecord {
            id: 1,
            plant_name: "Fern".to_string(),
            watered_at: now - Duration::hours(36),
            watering_interval: 2,
        };
        // 36 hours is one whole day elapsed.
        assert_eq!(days_until_next_watering(&record, now), 1);
    }

    #[test]
    fn test_status_serialization_uses_column_names() {
        let (record, now) = record(0, 7);
        let status = PlantStatus {
            id: record.id,
            plant_name: record.plant_name.clone(),
            watered_at: record.watered_at,
            watering_interval: record.watering_interval,
            days_until_next_watering: days_until_next_watering(&record, now),
        };

        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("plant_name"));
        assert!(json.contains("days_until_next_watering"));
    }
}
