use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub email: String,
    pub membership: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Member {
    pub fn new(name: String, email: String, membership: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            membership,
            role: "MEMBER".to_string(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == "ADMIN"
    }
}

/// Per-session prices by membership classification. Anything that is not a
/// full club member pays the guest rate.
#[derive(Debug, Clone, Copy)]
pub struct TierPricing {
    pub member: i64,
    pub guest: i64,
}

impl TierPricing {
    pub fn price_for(&self, membership: &str) -> i64 {
        if membership == "MEMBER" {
            self.member
        } else {
            self.guest
        }
    }
}
