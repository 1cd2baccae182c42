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
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub struct PostgresReservationRepo {
    pool: PgPool,
}

impl PostgresReservationRepo {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl ReservationRepository for PostgresReservationRepo {
    async fn create_batch(&self, reservations: &[Reservation], limits: &[DayCapacity]) -> Result<Vec<Reservation>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let mut created = Vec::with_capacity(reservations.len());

        for (reservation, limit) in reservations.iter().zip(limits) {
            // Row lock on the day serializes concurrent count+insert attempts
            // for the same (schedule, date).
            sqlx::query("SELECT id FROM day_availability WHERE schedule_id = $1 AND date = $2 FOR UPDATE")
                .bind(&limit.schedule_id)
                .bind(limit.date)
                .fetch_optional(&mut *tx)
                .await
                .map_err(AppError::Database)?;

            let row = sqlx::query(
                "SELECT COUNT(*) as count FROM reservations WHERE schedule_id = $1 AND date = $2 AND status != 'CANCELLED'"
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
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
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
        sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_owned(&self, member_id: &str, ids: &[String]) -> Result<Vec<Reservation>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE member_id = $1 AND id = ANY($2)"
        )
            .bind(member_id)
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn cancel_many(&self, ids: &[String]) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE reservations SET status = 'CANCELLED' WHERE id = ANY($1) AND status IN ('PENDING', 'CONFIRMED')"
        )
            .bind(ids)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn count_active_for_day(&self, schedule_id: &str, date: NaiveDate) -> Result<i64, AppError> {
        let row = sqlx::query(
            "SELECT COUNT(*) as count FROM reservations WHERE schedule_id = $1 AND date = $2 AND status != 'CANCELLED'"
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
            "SELECT COUNT(*) as count FROM reservations WHERE member_id = $1 AND schedule_id = $2 AND date = $3 AND status != 'CANCELLED'"
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
        let row = sqlx::query("SELECT COUNT(*) as count FROM reservations WHERE schedule_id = $1")
            .bind(schedule_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(row.get::<i64, _>("count"))
    }

    async fn complete(&self, id: &str) -> Result<Reservation, AppError> {
        sqlx::query_as::<_, Reservation>(
            "UPDATE reservations SET status = 'COMPLETED' WHERE id = $1 AND status IN ('PENDING', 'CONFIRMED') RETURNING *"
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
            "SELECT * FROM reservations WHERE member_id = $1 AND date >= $2 AND date <= $3 ORDER BY date ASC"
        )
            .bind(member_id)
            .bind(start)
            .bind(end)
            .fetch_all(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let next_month_open = sqlx::query_as::<_, DayAvailability>(
            "SELECT * FROM day_availability WHERE date >= $1 AND date <= $2 AND is_available = TRUE ORDER BY date ASC"
        )
            .bind(next_start)
            .bind(next_end)
            .fetch_all(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let refund_row = sqlx::query(
            "SELECT COALESCE(SUM(amount), 0) as total FROM cancellation_refunds WHERE member_id = $1 AND status = 'PENDING'"
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
             WHERE date >= $1 AND date <= $2 AND status != 'CANCELLED'
             GROUP BY schedule_id, date"
        )
            .bind(start)
            .bind(end)
            .fetch_all(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let availability = sqlx::query_as::<_, DayAvailability>(
            "SELECT * FROM day_availability WHERE date >= $1 AND date <= $2 ORDER BY date ASC"
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
                   VALUES ($1, $2, $3, FALSE, NULL, $4, $5)
                   ON CONFLICT(schedule_id, date) DO UPDATE SET
                   is_available = FALSE"#
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
                 WHERE r.schedule_id = $1 AND r.date = $2 AND r.status IN ('PENDING', 'CONFIRMED')
                 FOR UPDATE OF r"
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

                sqlx::query("UPDATE reservations SET status = 'CANCELLED' WHERE id = $1")
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
                     VALUES ($1, $2, $3, $4, $5, $6)"
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
