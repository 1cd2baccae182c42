use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub notify_service_url: String,
    pub notify_service_token: String,
    pub member_session_price: i64,
    pub guest_session_price: i64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            notify_service_url: env::var("NOTIFY_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8000/api/v1/send".to_string()),
            notify_service_token: env::var("NOTIFY_SERVICE_TOKEN").unwrap_or_else(|_| "test-token-1".to_string()),
            member_session_price: env::var("MEMBER_SESSION_PRICE").unwrap_or_else(|_| "7000".to_string()).parse().expect("MEMBER_SESSION_PRICE must be a number"),
            guest_session_price: env::var("GUEST_SESSION_PRICE").unwrap_or_else(|_| "10000".to_string()).parse().expect("GUEST_SESSION_PRICE must be a number"),
        }
    }
}
