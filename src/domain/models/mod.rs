pub mod member;
pub mod schedule;
pub mod day_availability;
pub mod reservation;
pub mod refund;
pub mod payment;
pub mod notification;
