use crate::domain::{models::day_availability::DayAvailability, ports::DayAvailabilityRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;
use chrono::NaiveDate;

pub struct SqliteAvailabilityRepo {
    pool: SqlitePool,
}

impl SqliteAvailabilityRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl DayAvailabilityRepository for SqliteAvailabilityRepo {
    async fn open_day(&self, entity: &DayAvailability) -> Result<DayAvailability, AppError> {
        sqlx::query_as::<_, DayAvailability>(
            r#"INSERT INTO day_availability (id, schedule_id, date, is_available, capacity_override, created_by, created_at)
               VALUES (?, ?, ?, 1, NULL, ?, ?)
               ON CONFLICT(schedule_id, date) DO UPDATE SET
               is_available = 1
               RETURNING *"#
        )
            .bind(&entity.id)
            .bind(&entity.schedule_id)
            .bind(entity.date)
            .bind(&entity.created_by)
            .bind(entity.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn set_capacity(&self, entity: &DayAvailability) -> Result<DayAvailability, AppError> {
        sqlx::query_as::<_, DayAvailability>(
            r#"INSERT INTO day_availability (id, schedule_id, date, is_available, capacity_override, created_by, created_at)
               VALUES (?, ?, ?, 1, ?, ?, ?)
               ON CONFLICT(schedule_id, date) DO UPDATE SET
               capacity_override = excluded.capacity_override
               RETURNING *"#
        )
            .bind(&entity.id)
            .bind(&entity.schedule_id)
            .bind(entity.date)
            .bind(entity.capacity_override)
            .bind(&entity.created_by)
            .bind(entity.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_day(&self, schedule_id: &str, date: NaiveDate) -> Result<Option<DayAvailability>, AppError> {
        sqlx::query_as::<_, DayAvailability>(
            "SELECT * FROM day_availability WHERE schedule_id = ? AND date = ?"
        )
            .bind(schedule_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DayAvailability>, AppError> {
        sqlx::query_as::<_, DayAvailability>(
            "SELECT * FROM day_availability WHERE date >= ? AND date <= ? ORDER BY date ASC"
        )
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
