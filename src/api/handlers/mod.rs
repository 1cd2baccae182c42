pub mod health;
pub mod member;
pub mod schedule;
pub mod reservation;
pub mod admin_day;
pub mod payment;
