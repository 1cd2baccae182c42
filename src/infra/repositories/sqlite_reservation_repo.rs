use crate::domain::models::day_availability::{DayAvailability, DayCapacity};
use crate::domain::models::member::TierPricing;
use crate::domain::models::refund::CancellationRefund;
use crate::domain::models::reservation::{
    AdminMonthView, DayCancellationOutcome, DayOccupancy, MemberMonthView, Reservation,
};
use crate::domain::ports::ReservationRepository;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

pub struct SqliteReservationRepo {
    pool: SqlitePool,
}

impl SqliteReservationRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl ReservationRepository for SqliteReservationRepo {
    async fn create_batch(&self, reservations: &[Reservation], limits: &[DayCapacity]) -> Result<Vec<Reservation>, AppError> {
        // SQLite serializes writers, so the count below cannot race another
        // batch once the write transaction has started.
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let mut created = Vec::with_capacity(reservations.len());

        for (reservation, limit) in reservations.iter().zip(limits) {
            let row = sqlx::query(
                "SELECT COUNT(*) as count FROM reservations WHERE schedule_id = ? AND date = ? AND status != 'CANCELLED'"
            )
                .bind(&limit.schedule_id)
                .bind(limit.date)
                .fetch_one(&mut *tx)
                .await
                .map_err(AppError::Database)?;

            if row.get::<i64, _>("count") >= limit.capacity as i64 {
                return Err(AppError::Conflict(format!("{} is fully booked", limit.date)));
            }

            let inserted = sqlx::query_as::<_, Reservation>(
                "INSERT INTO reservations (id, member_id, schedule_id, date, status, is_paid, paid_at, paid_confirmed_by, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                 RETURNING *"
            )
                .bind(&reservation.id)
                .bind(&reservation.member_id)
                .bind(&reservation.schedule_id)
                .bind(reservation.date)
                .bind(&reservation.status)
                .bind(reservation.is_paid)
                .bind(reservation.paid_at)
                .bind(&reservation.paid_confirmed_by)
                .bind(reservation.created_at)
                .fetch_one(&mut *tx)
                .await
                .map_err(AppError::Database)?;

            created.push(inserted);
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Reservation>, AppError> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_owned(&self, member_id: &str, ids: &[String]) -> Result<Vec<Reservation>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = ids.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
        let sql = format!(
            "SELECT * FROM reservations WHERE member_id = ? AND id IN ({})",
            placeholders
        );

        let mut query = sqlx::query_as::<_, Reservation>(&sql).bind(member_id);
        for id in ids {
            query = query.bind(id);
        }

        query.fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn cancel_many(&self, ids: &[String]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        for id in ids {
            sqlx::query(
                "UPDATE reservations SET status = 'CANCELLED' WHERE id = ? AND status IN ('PENDING', 'CONFIRMED')"
            )
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn count_active_for_day(&self, schedule_id: &str, date: NaiveDate) -> Result<i64, AppError> {
        let row = sqlx::query(
            "SELECT COUNT(*) as count FROM reservations WHERE schedule_id = ? AND date = ? AND status != 'CANCELLED'"
        )
            .bind(schedule_id)
            .bind(date)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(row.get::<i64, _>("count"))
    }

    async fn exists_active(&self, member_id: &str, schedule_id: &str, date: NaiveDate) -> Result<bool, AppError> {
        let row = sqlx::query(
            "SELECT COUNT(*) as count FROM reservations WHERE member_id = ? AND schedule_id = ? AND date = ? AND status != 'CANCELLED'"
        )
            .bind(member_id)
            .bind(schedule_id)
            .bind(date)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(row.get::<i64, _>("count") > 0)
    }

    async fn count_for_schedule(&self, schedule_id: &str) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM reservations WHERE schedule_id = ?")
            .bind(schedule_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(row.get::<i64, _>("count"))
    }

    async fn complete(&self, id: &str) -> Result<Reservation, AppError> {
        sqlx::query_as::<_, Reservation>(
            "UPDATE reservations SET status = 'COMPLETED' WHERE id = ? AND status IN ('PENDING', 'CONFIRMED') RETURNING *"
        )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::Conflict("Reservation is not in a completable state".into()))
    }

    async fn member_month_view(
        &self,
        member_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        next_start: NaiveDate,
        next_end: NaiveDate,
    ) -> Result<MemberMonthView, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let reservations = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE member_id = ? AND date >= ? AND date <= ? ORDER BY date ASC"
        )
            .bind(member_id)
            .bind(start)
            .bind(end)
            .fetch_all(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let next_month_open = sqlx::query_as::<_, DayAvailability>(
            "SELECT * FROM day_availability WHERE date >= ? AND date <= ? AND is_available = 1 ORDER BY date ASC"
        )
            .bind(next_start)
            .bind(next_end)
            .fetch_all(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let refund_row = sqlx::query(
            "SELECT COALESCE(SUM(amount), 0) as total FROM cancellation_refunds WHERE member_id = ? AND status = 'PENDING'"
        )
            .bind(member_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;

        Ok(MemberMonthView {
            reservations,
            next_month_open,
            pending_refund_total: refund_row.get::<i64, _>("total"),
        })
    }

    async fn admin_month_view(&self, start: NaiveDate, end: NaiveDate) -> Result<AdminMonthView, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let occupancy = sqlx::query_as::<_, DayOccupancy>(
            "SELECT schedule_id, date, COUNT(*) as reserved FROM reservations
             WHERE date >= ? AND date <= ? AND status != 'CANCELLED'
             GROUP BY schedule_id, date"
        )
            .bind(start)
            .bind(end)
            .fetch_all(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let availability = sqlx::query_as::<_, DayAvailability>(
            "SELECT * FROM day_availability WHERE date >= ? AND date <= ? ORDER BY date ASC"
        )
            .bind(start)
            .bind(end)
            .fetch_all(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;

        Ok(AdminMonthView { occupancy, availability })
    }

    async fn cancel_days(
        &self,
        days: &[(String, NaiveDate)],
        cancelled_by: &str,
        pricing: TierPricing,
    ) -> Result<DayCancellationOutcome, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let mut reservations_cancelled = 0i64;
        let mut refunds_created = 0i64;

        for (schedule_id, date) in days {
            sqlx::query(
                r#"INSERT INTO day_availability (id, schedule_id, date, is_available, capacity_override, created_by, created_at)
                   VALUES (?, ?, ?, 0, NULL, ?, ?)
                   ON CONFLICT(schedule_id, date) DO UPDATE SET
                   is_available = 0"#
            )
                .bind(Uuid::new_v4().to_string())
                .bind(schedule_id)
                .bind(date)
                .bind(cancelled_by)
                .bind(chrono::Utc::now())
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;

            // CANCELLED is only reachable from PENDING/CONFIRMED; completed
            // rows on the day are left alone.
            let live = sqlx::query(
                "SELECT r.id, r.member_id, m.membership FROM reservations r
                 JOIN members m ON m.id = r.member_id
                 WHERE r.schedule_id = ? AND r.date = ? AND r.status IN ('PENDING', 'CONFIRMED')"
            )
                .bind(schedule_id)
                .bind(date)
                .fetch_all(&mut *tx)
                .await
                .map_err(AppError::Database)?;

            for row in live {
                let reservation_id: String = row.get("id");
                let member_id: String = row.get("member_id");
                let membership: String = row.get("membership");

                sqlx::query("UPDATE reservations SET status = 'CANCELLED' WHERE id = ?")
                    .bind(&reservation_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(AppError::Database)?;
                reservations_cancelled += 1;

                let refund = CancellationRefund::new(
                    member_id,
                    reservation_id,
                    pricing.price_for(&membership),
                );
                sqlx::query(
                    "INSERT INTO cancellation_refunds (id, member_id, reservation_id, amount, status, created_at)
                     VALUES (?, ?, ?, ?, ?, ?)"
                )
                    .bind(&refund.id)
                    .bind(&refund.member_id)
                    .bind(&refund.reservation_id)
                    .bind(refund.amount)
                    .bind(&refund.status)
                    .bind(refund.created_at)
                    .execute(&mut *tx)
                    .await
                    .map_err(AppError::Database)?;
                refunds_created += 1;
            }
        }

        tx.commit().await.map_err(AppError::Database)?;

        Ok(DayCancellationOutcome {
            days_closed: days.len() as i64,
            reservations_cancelled,
            refunds_created,
        })
    }
}
