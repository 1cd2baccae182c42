use crate::domain::{models::day_availability::DayAvailability, ports::DayAvailabilityRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;
use chrono::NaiveDate;

pub struct PostgresAvailabilityRepo {
    pool: PgPool,
}

impl PostgresAvailabilityRepo {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl DayAvailabilityRepository for PostgresAvailabilityRepo {
    async fn open_day(&self, entity: &DayAvailability) -> Result<DayAvailability, AppError> {
        sqlx::query_as::<_, DayAvailability>(
            r#"INSERT INTO day_availability (id, schedule_id, date, is_available, capacity_override, created_by, created_at)
               VALUES ($1, $2, $3, TRUE, NULL, $4, $5)
               ON CONFLICT(schedule_id, date) DO UPDATE SET
               is_available = TRUE
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
               VALUES ($1, $2, $3, TRUE, $4, $5, $6)
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
            "SELECT * FROM day_availability WHERE schedule_id = $1 AND date = $2"
        )
            .bind(schedule_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DayAvailability>, AppError> {
        sqlx::query_as::<_, DayAvailability>(
            "SELECT * FROM day_availability WHERE date >= $1 AND date <= $2 ORDER BY date ASC"
        )
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
