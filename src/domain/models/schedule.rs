use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A recurring weekly pool session. `day_of_week` follows chrono's
/// `num_days_from_monday`: 0 = Monday .. 6 = Sunday.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Schedule {
    pub id: String,
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
    pub default_capacity: i32,
    pub lane_count: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

pub struct NewScheduleParams {
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
    pub default_capacity: i32,
    pub lane_count: i32,
}

impl Schedule {
    pub fn new(params: NewScheduleParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            day_of_week: params.day_of_week,
            start_time: params.start_time,
            end_time: params.end_time,
            default_capacity: params.default_capacity,
            lane_count: params.lane_count,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}
