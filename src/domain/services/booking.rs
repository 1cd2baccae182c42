use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::models::day_availability::{effective_capacity, DayAvailability, DayCapacity};
use crate::domain::models::member::{Member, TierPricing};
use crate::domain::models::notification::{BatchConfirmation, ReleaseConfirmation};
use crate::domain::models::payment::PaymentRecord;
use crate::domain::models::reservation::{DayCancellationOutcome, Reservation};
use crate::domain::models::schedule::{NewScheduleParams, Schedule};
use crate::domain::ports::{
    DayAvailabilityRepository, Notifier, PaymentRepository, RefundRepository,
    ReservationRepository, ScheduleRepository,
};
use crate::domain::services::month::{
    in_month, month_bounds, month_dates, next_month, parse_day, parse_month, weekday_index,
};
use crate::error::AppError;

#[derive(Debug, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub schedule_id: String,
    pub status: Option<String>,
    pub reservation_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MonthlyContext {
    pub month: String,
    pub days: Vec<CalendarDay>,
    pub can_reserve_next_month: bool,
    pub next_month_open_dates: Vec<NaiveDate>,
    pub price_per_session: i64,
    pub pending_refund_total: i64,
}

#[derive(Debug, Serialize)]
pub struct BatchOutcome {
    pub reservations: Vec<Reservation>,
    pub session_count: i64,
    pub price_per_session: i64,
    pub pending_refund_total: i64,
    pub total_amount: i64,
}

#[derive(Debug, Serialize)]
pub struct ReleaseOutcome {
    pub released_ids: Vec<String>,
    pub released_dates: Vec<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct OpenDaysOutcome {
    pub opened: Vec<NaiveDate>,
    pub skipped: Vec<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct AdminCalendarDay {
    pub date: NaiveDate,
    pub schedule_id: String,
    pub reserved: i64,
    pub capacity: i32,
    pub is_available: bool,
}

#[derive(Debug, Serialize)]
pub struct AdminCalendar {
    pub month: String,
    pub days: Vec<AdminCalendarDay>,
}

pub struct UpdateScheduleParams {
    pub day_of_week: Option<i32>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub default_capacity: Option<i32>,
    pub lane_count: Option<i32>,
    pub is_active: Option<bool>,
}

/// Orchestrates the reservation stores. Sole writer of reservation status and
/// of refund/payment creation; constructed with its dependencies explicitly.
pub struct BookingEngine {
    schedules: Arc<dyn ScheduleRepository>,
    availability: Arc<dyn DayAvailabilityRepository>,
    reservations: Arc<dyn ReservationRepository>,
    refunds: Arc<dyn RefundRepository>,
    payments: Arc<dyn PaymentRepository>,
    notifier: Arc<dyn Notifier>,
    pricing: TierPricing,
}

impl BookingEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        schedules: Arc<dyn ScheduleRepository>,
        availability: Arc<dyn DayAvailabilityRepository>,
        reservations: Arc<dyn ReservationRepository>,
        refunds: Arc<dyn RefundRepository>,
        payments: Arc<dyn PaymentRepository>,
        notifier: Arc<dyn Notifier>,
        pricing: TierPricing,
    ) -> Self {
        Self {
            schedules,
            availability,
            reservations,
            refunds,
            payments,
            notifier,
            pricing,
        }
    }

    async fn active_schedule_map(&self) -> Result<HashMap<i32, Schedule>, AppError> {
        let schedules = self.schedules.list_active().await?;
        Ok(schedules.into_iter().map(|s| (s.day_of_week, s)).collect())
    }

    // --- Schedule registry ---

    pub async fn list_schedules(&self) -> Result<Vec<Schedule>, AppError> {
        self.schedules.list_active().await
    }

    pub async fn create_schedule(&self, params: NewScheduleParams) -> Result<Schedule, AppError> {
        validate_schedule_fields(
            params.day_of_week,
            &params.start_time,
            &params.end_time,
            params.default_capacity,
            params.lane_count,
        )?;

        if self.schedules.find_active_by_weekday(params.day_of_week).await?.is_some() {
            return Err(AppError::Conflict("An active schedule already exists for that weekday".into()));
        }

        let created = self.schedules.create(&Schedule::new(params)).await?;
        info!("Created schedule {} for weekday {}", created.id, created.day_of_week);
        Ok(created)
    }

    pub async fn update_schedule(&self, id: &str, params: UpdateScheduleParams) -> Result<Schedule, AppError> {
        let mut schedule = self.schedules.find_by_id(id).await?
            .ok_or(AppError::NotFound("Schedule not found".into()))?;

        if let Some(dow) = params.day_of_week { schedule.day_of_week = dow; }
        if let Some(start) = params.start_time { schedule.start_time = start; }
        if let Some(end) = params.end_time { schedule.end_time = end; }
        if let Some(cap) = params.default_capacity { schedule.default_capacity = cap; }
        if let Some(lanes) = params.lane_count { schedule.lane_count = lanes; }
        if let Some(active) = params.is_active { schedule.is_active = active; }

        validate_schedule_fields(
            schedule.day_of_week,
            &schedule.start_time,
            &schedule.end_time,
            schedule.default_capacity,
            schedule.lane_count,
        )?;

        if schedule.is_active {
            let existing = self.schedules.find_active_by_weekday(schedule.day_of_week).await?;
            if existing.is_some_and(|e| e.id != schedule.id) {
                return Err(AppError::Conflict("An active schedule already exists for that weekday".into()));
            }
        }

        self.schedules.update(&schedule).await
    }

    /// Soft-deletes (deactivates) when reservations reference the schedule,
    /// hard-deletes otherwise.
    pub async fn delete_schedule(&self, id: &str) -> Result<bool, AppError> {
        let schedule = self.schedules.find_by_id(id).await?
            .ok_or(AppError::NotFound("Schedule not found".into()))?;

        let referenced = self.reservations.count_for_schedule(&schedule.id).await? > 0;
        if referenced {
            self.schedules.deactivate(&schedule.id).await?;
            info!("Deactivated schedule {} (reservations reference it)", schedule.id);
        } else {
            self.schedules.delete(&schedule.id).await?;
            info!("Deleted schedule {}", schedule.id);
        }
        Ok(referenced)
    }

    // --- Member-facing operations ---

    pub async fn monthly_context(&self, member: &Member, month: &str) -> Result<MonthlyContext, AppError> {
        let (year, mon) = parse_month(month)?;
        let (start, end) = month_bounds(year, mon);
        let (next_year, next_mon) = next_month(year, mon);
        let (next_start, next_end) = month_bounds(next_year, next_mon);

        let by_weekday = self.active_schedule_map().await?;
        let view = self
            .reservations
            .member_month_view(&member.id, start, end, next_start, next_end)
            .await?;

        let mut days = Vec::new();
        for date in month_dates(year, mon) {
            let Some(schedule) = by_weekday.get(&weekday_index(date)) else {
                continue;
            };

            let live = view.reservations.iter()
                .find(|r| r.schedule_id == schedule.id && r.date == date && r.status != "CANCELLED");
            let cancelled = view.reservations.iter()
                .find(|r| r.schedule_id == schedule.id && r.date == date && r.status == "CANCELLED");

            let (status, reservation_id) = match (live, cancelled) {
                (Some(r), _) => (Some("RESERVED".to_string()), Some(r.id.clone())),
                (None, Some(r)) => (Some("CANCELLED".to_string()), Some(r.id.clone())),
                (None, None) => (None, None),
            };

            days.push(CalendarDay {
                date,
                schedule_id: schedule.id.clone(),
                status,
                reservation_id,
            });
        }

        let mut open_dates: Vec<NaiveDate> = view
            .next_month_open
            .iter()
            .filter(|a| a.is_available)
            .map(|a| a.date)
            .collect();
        open_dates.sort();
        open_dates.dedup();

        Ok(MonthlyContext {
            month: month.to_string(),
            days,
            can_reserve_next_month: !open_dates.is_empty(),
            next_month_open_dates: open_dates,
            price_per_session: self.pricing.price_for(&member.membership),
            pending_refund_total: view.pending_refund_total,
        })
    }

    /// Batch enrollment for the next calendar month. Validates every date in
    /// the submitted order, then inserts all rows in one capacity-checked
    /// transaction. The first failing date aborts the whole batch.
    pub async fn create_batch_reservations(&self, member: &Member, dates: &[String]) -> Result<BatchOutcome, AppError> {
        if dates.is_empty() {
            return Err(AppError::Validation("No dates supplied".into()));
        }

        let today = Utc::now().date_naive();
        let (next_year, next_mon) = next_month(today.year(), today.month());
        let by_weekday = self.active_schedule_map().await?;

        let mut rows = Vec::with_capacity(dates.len());
        let mut limits: Vec<DayCapacity> = Vec::new();
        let mut seen: HashSet<NaiveDate> = HashSet::new();
        let mut parsed = Vec::with_capacity(dates.len());

        for raw in dates {
            let date = parse_day(raw)?;

            if !in_month(date, next_year, next_mon) {
                return Err(AppError::Window(format!("{} is not in the upcoming month", date)));
            }

            let schedule = by_weekday
                .get(&weekday_index(date))
                .ok_or_else(|| AppError::NotFound(format!("No session scheduled on {}", date)))?;

            let availability = self.availability.find_by_day(&schedule.id, date).await?;
            if !availability.as_ref().is_some_and(|a| a.is_available) {
                return Err(AppError::Conflict(format!("{} is not open for enrollment", date)));
            }

            let capacity = effective_capacity(schedule, availability.as_ref());
            let reserved = self.reservations.count_active_for_day(&schedule.id, date).await?;
            if reserved >= capacity as i64 {
                return Err(AppError::Conflict(format!("{} is fully booked", date)));
            }

            if !seen.insert(date) || self.reservations.exists_active(&member.id, &schedule.id, date).await? {
                return Err(AppError::Conflict(format!("Already reserved on {}", date)));
            }

            rows.push(Reservation::new(member.id.clone(), schedule.id.clone(), date));
            limits.push(DayCapacity {
                schedule_id: schedule.id.clone(),
                date,
                capacity,
            });
            parsed.push(date);
        }

        let created = self.reservations.create_batch(&rows, &limits).await?;

        let pending_refund_total = self.refunds.sum_pending(&member.id).await?;
        let price = self.pricing.price_for(&member.membership);
        let session_count = created.len() as i64;
        let total_amount = (session_count * price - pending_refund_total).max(0);

        info!(
            "Batch enrollment for member {}: {} sessions, total {}",
            member.id, session_count, total_amount
        );

        let details = BatchConfirmation {
            dates: parsed,
            session_count,
            total_amount,
        };
        if let Err(e) = self.notifier.send_batch_confirmation(member, &details).await {
            warn!("Batch confirmation notification failed for member {}: {}", member.id, e);
        }

        Ok(BatchOutcome {
            reservations: created,
            session_count,
            price_per_session: price,
            pending_refund_total,
            total_amount,
        })
    }

    /// Cancels the caller's own future, non-terminal reservations. Anything
    /// not meeting the filter is silently skipped; no refund is generated.
    pub async fn release_slots(&self, member: &Member, reservation_ids: &[String]) -> Result<ReleaseOutcome, AppError> {
        let owned = self.reservations.list_owned(&member.id, reservation_ids).await?;
        let today = Utc::now().date_naive();

        let releasable: Vec<&Reservation> = owned
            .iter()
            .filter(|r| r.date > today && !r.is_terminal())
            .collect();

        if releasable.is_empty() {
            return Err(AppError::Conflict("No releasable reservations".into()));
        }

        let ids: Vec<String> = releasable.iter().map(|r| r.id.clone()).collect();
        let mut dates: Vec<NaiveDate> = releasable.iter().map(|r| r.date).collect();
        dates.sort();

        self.reservations.cancel_many(&ids).await?;
        info!("Member {} released {} reservations", member.id, ids.len());

        let details = ReleaseConfirmation { dates: dates.clone() };
        if let Err(e) = self.notifier.send_release_confirmation(member, &details).await {
            warn!("Release confirmation notification failed for member {}: {}", member.id, e);
        }

        Ok(ReleaseOutcome {
            released_ids: ids,
            released_dates: dates,
        })
    }

    // --- Admin operations ---

    /// Opens next-month days for enrollment. Additive and tolerant: dates
    /// outside the window or without an active schedule are skipped, and
    /// re-opening an open day is a no-op.
    pub async fn open_next_month(&self, admin: &Member, dates: &[String]) -> Result<OpenDaysOutcome, AppError> {
        let today = Utc::now().date_naive();
        let (next_year, next_mon) = next_month(today.year(), today.month());
        let by_weekday = self.active_schedule_map().await?;

        let mut opened = Vec::new();
        let mut skipped = Vec::new();

        for raw in dates {
            let date = parse_day(raw)?;

            if !in_month(date, next_year, next_mon) {
                skipped.push(date);
                continue;
            }
            let Some(schedule) = by_weekday.get(&weekday_index(date)) else {
                skipped.push(date);
                continue;
            };

            let entity = DayAvailability::new(schedule.id.clone(), date, admin.id.clone());
            self.availability.open_day(&entity).await?;
            opened.push(date);
        }

        opened.sort();
        info!("Opened {} days for next month ({} skipped)", opened.len(), skipped.len());
        Ok(OpenDaysOutcome { opened, skipped })
    }

    /// Closes the given days and cancels every live reservation on them,
    /// writing one pending refund per cancellation, atomically.
    pub async fn cancel_days(&self, admin: &Member, dates: &[String]) -> Result<DayCancellationOutcome, AppError> {
        let by_weekday = self.active_schedule_map().await?;

        let mut days = Vec::new();
        for raw in dates {
            let date = parse_day(raw)?;
            match by_weekday.get(&weekday_index(date)) {
                Some(schedule) => days.push((schedule.id.clone(), date)),
                None => warn!("cancel_days: no active schedule on {}, skipping", date),
            }
        }

        if days.is_empty() {
            return Err(AppError::Validation("No cancellable days supplied".into()));
        }

        let outcome = self.reservations.cancel_days(&days, &admin.id, self.pricing).await?;
        info!(
            "Cancelled {} days: {} reservations cancelled, {} refunds created",
            outcome.days_closed, outcome.reservations_cancelled, outcome.refunds_created
        );
        Ok(outcome)
    }

    /// Capacity override for a date in the current calendar month. Existing
    /// occupancy above the new bound is left untouched.
    pub async fn update_day_capacity(
        &self,
        admin: &Member,
        date: &str,
        schedule_id: &str,
        capacity_override: i32,
    ) -> Result<DayAvailability, AppError> {
        let date = parse_day(date)?;
        if capacity_override < 0 {
            return Err(AppError::Validation("Capacity must not be negative".into()));
        }

        let today = Utc::now().date_naive();
        if !in_month(date, today.year(), today.month()) {
            return Err(AppError::Window("Capacity can only be changed for the current month".into()));
        }

        let schedule = self.schedules.find_by_id(schedule_id).await?
            .ok_or(AppError::NotFound("Schedule not found".into()))?;
        if schedule.day_of_week != weekday_index(date) {
            return Err(AppError::Validation("Date does not fall on the schedule's weekday".into()));
        }

        let mut entity = DayAvailability::new(schedule.id.clone(), date, admin.id.clone());
        entity.capacity_override = Some(capacity_override);

        let saved = self.availability.set_capacity(&entity).await?;
        info!("Capacity override for {} on {}: {}", schedule.id, date, capacity_override);
        Ok(saved)
    }

    pub async fn admin_calendar(&self, month: &str) -> Result<AdminCalendar, AppError> {
        let (year, mon) = parse_month(month)?;
        let (start, end) = month_bounds(year, mon);

        let by_weekday = self.active_schedule_map().await?;
        let view = self.reservations.admin_month_view(start, end).await?;

        let occupancy: HashMap<(String, NaiveDate), i64> = view
            .occupancy
            .into_iter()
            .map(|o| ((o.schedule_id, o.date), o.reserved))
            .collect();
        let availability: HashMap<(String, NaiveDate), DayAvailability> = view
            .availability
            .into_iter()
            .map(|a| ((a.schedule_id.clone(), a.date), a))
            .collect();

        let mut days = Vec::new();
        for date in month_dates(year, mon) {
            let Some(schedule) = by_weekday.get(&weekday_index(date)) else {
                continue;
            };
            let key = (schedule.id.clone(), date);
            let avail = availability.get(&key);

            days.push(AdminCalendarDay {
                date,
                schedule_id: schedule.id.clone(),
                reserved: occupancy.get(&key).copied().unwrap_or(0),
                capacity: effective_capacity(schedule, avail),
                is_available: avail.is_some_and(|a| a.is_available),
            });
        }

        Ok(AdminCalendar {
            month: month.to_string(),
            days,
        })
    }

    // --- Payment & completion ---

    pub async fn confirm_payment(
        &self,
        reservation_id: &str,
        amount: i64,
        method: &str,
        confirmed_by: &str,
    ) -> Result<PaymentRecord, AppError> {
        if amount < 0 {
            return Err(AppError::Validation("Amount must not be negative".into()));
        }
        if method.is_empty() {
            return Err(AppError::Validation("Payment method is required".into()));
        }

        let reservation = self.reservations.find_by_id(reservation_id).await?
            .ok_or(AppError::NotFound("Reservation not found".into()))?;

        if reservation.is_terminal() {
            return Err(AppError::TerminalState(format!(
                "Cannot confirm payment for a {} reservation",
                reservation.status
            )));
        }
        if reservation.is_paid {
            return Err(AppError::Conflict("Payment already confirmed".into()));
        }

        let record = PaymentRecord::new(
            reservation.id.clone(),
            amount,
            method.to_string(),
            confirmed_by.to_string(),
        );
        let saved = self.payments.confirm(&record).await?;
        info!("Payment confirmed for reservation {} ({} via {})", reservation.id, amount, method);
        Ok(saved)
    }

    pub async fn complete_reservation(&self, reservation_id: &str) -> Result<Reservation, AppError> {
        let reservation = self.reservations.find_by_id(reservation_id).await?
            .ok_or(AppError::NotFound("Reservation not found".into()))?;

        if reservation.is_terminal() {
            return Err(AppError::TerminalState(format!(
                "Cannot complete a {} reservation",
                reservation.status
            )));
        }

        let completed = self.reservations.complete(&reservation.id).await?;
        info!("Reservation {} completed", completed.id);
        Ok(completed)
    }
}

fn validate_schedule_fields(
    day_of_week: i32,
    start_time: &str,
    end_time: &str,
    default_capacity: i32,
    lane_count: i32,
) -> Result<(), AppError> {
    if !(0..=6).contains(&day_of_week) {
        return Err(AppError::Validation("day_of_week must be 0 (Monday) .. 6 (Sunday)".into()));
    }

    let start = NaiveTime::parse_from_str(start_time, "%H:%M")
        .map_err(|_| AppError::Validation("Invalid start time (HH:MM)".into()))?;
    let end = NaiveTime::parse_from_str(end_time, "%H:%M")
        .map_err(|_| AppError::Validation("Invalid end time (HH:MM)".into()))?;
    if start >= end {
        return Err(AppError::Validation("Start time must be before end time".into()));
    }

    if default_capacity < 0 {
        return Err(AppError::Validation("Capacity must not be negative".into()));
    }
    if lane_count < 1 {
        return Err(AppError::Validation("Lane count must be at least 1".into()));
    }
    Ok(())
}
