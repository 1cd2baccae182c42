use crate::domain::{models::schedule::Schedule, ports::ScheduleRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresScheduleRepo {
    pool: PgPool,
}

impl PostgresScheduleRepo {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl ScheduleRepository for PostgresScheduleRepo {
    async fn create(&self, schedule: &Schedule) -> Result<Schedule, AppError> {
        sqlx::query_as::<_, Schedule>(
            "INSERT INTO schedules (id, day_of_week, start_time, end_time, default_capacity, lane_count, is_active, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING *"
        )
            .bind(&schedule.id)
            .bind(schedule.day_of_week)
            .bind(&schedule.start_time)
            .bind(&schedule.end_time)
            .bind(schedule.default_capacity)
            .bind(schedule.lane_count)
            .bind(schedule.is_active)
            .bind(schedule.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, schedule: &Schedule) -> Result<Schedule, AppError> {
        sqlx::query_as::<_, Schedule>(
            "UPDATE schedules SET day_of_week=$1, start_time=$2, end_time=$3, default_capacity=$4, lane_count=$5, is_active=$6
             WHERE id=$7
             RETURNING *"
        )
            .bind(schedule.day_of_week)
            .bind(&schedule.start_time)
            .bind(&schedule.end_time)
            .bind(schedule.default_capacity)
            .bind(schedule.lane_count)
            .bind(schedule.is_active)
            .bind(&schedule.id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Schedule>, AppError> {
        sqlx::query_as::<_, Schedule>("SELECT * FROM schedules WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_active_by_weekday(&self, day_of_week: i32) -> Result<Option<Schedule>, AppError> {
        sqlx::query_as::<_, Schedule>(
            "SELECT * FROM schedules WHERE day_of_week = $1 AND is_active = TRUE LIMIT 1"
        )
            .bind(day_of_week)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_active(&self) -> Result<Vec<Schedule>, AppError> {
        sqlx::query_as::<_, Schedule>(
            "SELECT * FROM schedules WHERE is_active = TRUE ORDER BY day_of_week ASC, start_time ASC"
        )
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn deactivate(&self, id: &str) -> Result<(), AppError> {
        let res = sqlx::query("UPDATE schedules SET is_active = FALSE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if res.rows_affected() == 0 {
            return Err(AppError::NotFound("Schedule not found".into()));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let res = sqlx::query("DELETE FROM schedules WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if res.rows_affected() == 0 {
            return Err(AppError::NotFound("Schedule not found".into()));
        }
        Ok(())
    }
}
