use crate::domain::{models::refund::CancellationRefund, ports::RefundRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{PgPool, Row};

pub struct PostgresRefundRepo {
    pool: PgPool,
}

impl PostgresRefundRepo {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl RefundRepository for PostgresRefundRepo {
    async fn sum_pending(&self, member_id: &str) -> Result<i64, AppError> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(amount), 0)::BIGINT as total FROM cancellation_refunds WHERE member_id = $1 AND status = 'PENDING'"
        )
            .bind(member_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(row.get::<i64, _>("total"))
    }

    async fn list_by_member(&self, member_id: &str) -> Result<Vec<CancellationRefund>, AppError> {
        sqlx::query_as::<_, CancellationRefund>(
            "SELECT * FROM cancellation_refunds WHERE member_id = $1 ORDER BY created_at ASC"
        )
            .bind(member_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
