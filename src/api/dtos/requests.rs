use serde::Deserialize;

#[derive(Deserialize)]
pub struct MonthQuery {
    pub month: String,
}

#[derive(Deserialize)]
pub struct CreateScheduleRequest {
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
    pub default_capacity: i32,
    pub lane_count: i32,
}

#[derive(Deserialize)]
pub struct UpdateScheduleRequest {
    pub day_of_week: Option<i32>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub default_capacity: Option<i32>,
    pub lane_count: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize)]
pub struct BatchReservationRequest {
    pub dates: Vec<String>,
}

#[derive(Deserialize)]
pub struct ReleaseSlotsRequest {
    pub reservation_ids: Vec<String>,
}

#[derive(Deserialize)]
pub struct OpenDaysRequest {
    pub dates: Vec<String>,
}

#[derive(Deserialize)]
pub struct CancelDaysRequest {
    pub dates: Vec<String>,
}

#[derive(Deserialize)]
pub struct UpdateDayCapacityRequest {
    pub date: String,
    pub schedule_id: String,
    pub capacity_override: i32,
}

#[derive(Deserialize)]
pub struct ConfirmPaymentRequest {
    pub reservation_id: String,
    pub amount: i64,
    pub method: String,
}

#[derive(Deserialize)]
pub struct CreateMemberRequest {
    pub name: String,
    pub email: String,
    pub membership: String,
    pub role: Option<String>,
}
