use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Append-only audit row for a confirmed payment. Never mutated or deleted.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct PaymentRecord {
    pub id: String,
    pub reservation_id: String,
    pub amount: i64,
    pub method: String,
    pub confirmed_by: String,
    pub created_at: DateTime<Utc>,
}

impl PaymentRecord {
    pub fn new(reservation_id: String, amount: i64, method: String, confirmed_by: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            reservation_id,
            amount,
            method,
            confirmed_by,
            created_at: Utc::now(),
        }
    }
}
