use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::models::day_availability::DayAvailability;

/// One member's booking of one schedule on one date.
///
/// Status machine: PENDING -> CONFIRMED -> COMPLETED, with CANCELLED
/// reachable from PENDING or CONFIRMED only.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Reservation {
    pub id: String,
    pub member_id: String,
    pub schedule_id: String,
    pub date: NaiveDate,
    pub status: String,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub paid_confirmed_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    pub fn new(member_id: String, schedule_id: String, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            member_id,
            schedule_id,
            date,
            status: "PENDING".to_string(),
            is_paid: false,
            paid_at: None,
            paid_confirmed_by: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status == "CANCELLED" || self.status == "COMPLETED"
    }
}

/// Point-in-time month view for one member: their reservations in the
/// requested month, the open days of the following month, and their pending
/// refund balance, all read in one transaction.
#[derive(Debug)]
pub struct MemberMonthView {
    pub reservations: Vec<Reservation>,
    pub next_month_open: Vec<DayAvailability>,
    pub pending_refund_total: i64,
}

#[derive(Debug, FromRow)]
pub struct DayOccupancy {
    pub schedule_id: String,
    pub date: NaiveDate,
    pub reserved: i64,
}

#[derive(Debug)]
pub struct AdminMonthView {
    pub occupancy: Vec<DayOccupancy>,
    pub availability: Vec<DayAvailability>,
}

/// Result of an admin day cancellation: every affected day closed, every
/// live reservation on it cancelled, one pending refund per cancellation.
#[derive(Debug, Serialize)]
pub struct DayCancellationOutcome {
    pub days_closed: i64,
    pub reservations_cancelled: i64,
    pub refunds_created: i64,
}
