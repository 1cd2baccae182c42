use serde::Serialize;
use chrono::NaiveDate;

/// Payload for the enrollment confirmation sent after a batch commits.
#[derive(Debug, Serialize, Clone)]
pub struct BatchConfirmation {
    pub dates: Vec<NaiveDate>,
    pub session_count: i64,
    pub total_amount: i64,
}

/// Payload for the confirmation sent after a member releases future slots.
#[derive(Debug, Serialize, Clone)]
pub struct ReleaseConfirmation {
    pub dates: Vec<NaiveDate>,
}
