use crate::domain::{models::payment::PaymentRecord, ports::PaymentRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresPaymentRepo {
    pool: PgPool,
}

impl PostgresPaymentRepo {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepo {
    async fn confirm(&self, record: &PaymentRecord) -> Result<PaymentRecord, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let updated = sqlx::query(
            "UPDATE reservations SET status = 'CONFIRMED', is_paid = TRUE, paid_at = $1, paid_confirmed_by = $2
             WHERE id = $3 AND status IN ('PENDING', 'CONFIRMED') AND is_paid = FALSE"
        )
            .bind(record.created_at)
            .bind(&record.confirmed_by)
            .bind(&record.reservation_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        if updated.rows_affected() == 0 {
            return Err(AppError::Conflict("Reservation is not payable".into()));
        }

        let saved = sqlx::query_as::<_, PaymentRecord>(
            "INSERT INTO payment_records (id, reservation_id, amount, method, confirmed_by, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *"
        )
            .bind(&record.id)
            .bind(&record.reservation_id)
            .bind(record.amount)
            .bind(&record.method)
            .bind(&record.confirmed_by)
            .bind(record.created_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(saved)
    }

    async fn list_by_reservation(&self, reservation_id: &str) -> Result<Vec<PaymentRecord>, AppError> {
        sqlx::query_as::<_, PaymentRecord>(
            "SELECT * FROM payment_records WHERE reservation_id = $1 ORDER BY created_at ASC"
        )
            .bind(reservation_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
