use crate::domain::models::{
    member::{Member, TierPricing},
    schedule::Schedule,
    day_availability::{DayAvailability, DayCapacity},
    reservation::{Reservation, MemberMonthView, AdminMonthView, DayCancellationOutcome},
    refund::CancellationRefund,
    payment::PaymentRecord,
    notification::{BatchConfirmation, ReleaseConfirmation},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;

#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn create(&self, member: &Member) -> Result<Member, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Member>, AppError>;
    async fn list(&self) -> Result<Vec<Member>, AppError>;
}

#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn create(&self, schedule: &Schedule) -> Result<Schedule, AppError>;
    async fn update(&self, schedule: &Schedule) -> Result<Schedule, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Schedule>, AppError>;
    async fn find_active_by_weekday(&self, day_of_week: i32) -> Result<Option<Schedule>, AppError>;
    async fn list_active(&self) -> Result<Vec<Schedule>, AppError>;
    async fn deactivate(&self, id: &str) -> Result<(), AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait DayAvailabilityRepository: Send + Sync {
    /// Upsert keyed by (schedule_id, date) that opens the day. An existing
    /// capacity override on the row is left untouched.
    async fn open_day(&self, entity: &DayAvailability) -> Result<DayAvailability, AppError>;
    /// Upsert keyed by (schedule_id, date) that sets the capacity override.
    /// An existing availability flag on the row is left untouched.
    async fn set_capacity(&self, entity: &DayAvailability) -> Result<DayAvailability, AppError>;
    async fn find_by_day(&self, schedule_id: &str, date: NaiveDate) -> Result<Option<DayAvailability>, AppError>;
    async fn list_by_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DayAvailability>, AppError>;
}

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Insert the whole batch in one transaction, re-checking every day's
    /// capacity bound under the transaction before inserting. All rows commit
    /// or none do.
    async fn create_batch(&self, reservations: &[Reservation], limits: &[DayCapacity]) -> Result<Vec<Reservation>, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Reservation>, AppError>;
    /// The subset of `ids` owned by `member_id`. Foreign ids are dropped, not
    /// errored.
    async fn list_owned(&self, member_id: &str, ids: &[String]) -> Result<Vec<Reservation>, AppError>;
    async fn cancel_many(&self, ids: &[String]) -> Result<(), AppError>;
    async fn count_active_for_day(&self, schedule_id: &str, date: NaiveDate) -> Result<i64, AppError>;
    async fn exists_active(&self, member_id: &str, schedule_id: &str, date: NaiveDate) -> Result<bool, AppError>;
    async fn count_for_schedule(&self, schedule_id: &str) -> Result<i64, AppError>;
    async fn complete(&self, id: &str) -> Result<Reservation, AppError>;
    async fn member_month_view(
        &self,
        member_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        next_start: NaiveDate,
        next_end: NaiveDate,
    ) -> Result<MemberMonthView, AppError>;
    async fn admin_month_view(&self, start: NaiveDate, end: NaiveDate) -> Result<AdminMonthView, AppError>;
    /// Close the given days, cancel every live reservation on them and write
    /// one pending refund per cancellation at the owner's tier price, all in
    /// one transaction.
    async fn cancel_days(
        &self,
        days: &[(String, NaiveDate)],
        cancelled_by: &str,
        pricing: TierPricing,
    ) -> Result<DayCancellationOutcome, AppError>;
}

#[async_trait]
pub trait RefundRepository: Send + Sync {
    async fn sum_pending(&self, member_id: &str) -> Result<i64, AppError>;
    async fn list_by_member(&self, member_id: &str) -> Result<Vec<CancellationRefund>, AppError>;
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Insert the payment record and move the reservation to CONFIRMED/paid
    /// in one transaction. Fails with Conflict if the reservation is no
    /// longer payable when the update runs.
    async fn confirm(&self, record: &PaymentRecord) -> Result<PaymentRecord, AppError>;
    async fn list_by_reservation(&self, reservation_id: &str) -> Result<Vec<PaymentRecord>, AppError>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_batch_confirmation(&self, member: &Member, details: &BatchConfirmation) -> Result<(), AppError>;
    async fn send_release_confirmation(&self, member: &Member, details: &ReleaseConfirmation) -> Result<(), AppError>;
}
