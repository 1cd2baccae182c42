use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Pending credit owed to a member after an admin cancelled a day they had
/// booked. Netted against the next batch total; stays PENDING until an
/// explicit reconciliation marks it APPLIED.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct CancellationRefund {
    pub id: String,
    pub member_id: String,
    pub reservation_id: String,
    pub amount: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl CancellationRefund {
    pub fn new(member_id: String, reservation_id: String, amount: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            member_id,
            reservation_id,
            amount,
            status: "PENDING".to_string(),
            created_at: Utc::now(),
        }
    }
}
