use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::models::schedule::Schedule;

/// Per-date override for one schedule. A date with no row is closed for new
/// enrollment; `capacity_override` replaces the schedule default for that
/// date only. Unique per (schedule_id, date).
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct DayAvailability {
    pub id: String,
    pub schedule_id: String,
    pub date: NaiveDate,
    pub is_available: bool,
    pub capacity_override: Option<i32>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl DayAvailability {
    pub fn new(schedule_id: String, date: NaiveDate, created_by: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            schedule_id,
            date,
            is_available: true,
            capacity_override: None,
            created_by,
            created_at: Utc::now(),
        }
    }
}

pub fn effective_capacity(schedule: &Schedule, availability: Option<&DayAvailability>) -> i32 {
    availability
        .and_then(|a| a.capacity_override)
        .unwrap_or(schedule.default_capacity)
}

/// Capacity bound a batch insert must respect for one (schedule, date) pair.
/// Re-checked inside the insert transaction.
#[derive(Debug, Clone)]
pub struct DayCapacity {
    pub schedule_id: String,
    pub date: NaiveDate,
    pub capacity: i32,
}
