use std::sync::Arc;
use crate::domain::ports::{
    MemberRepository, ScheduleRepository, DayAvailabilityRepository,
    ReservationRepository, RefundRepository, PaymentRepository, Notifier,
};
use crate::domain::services::booking::BookingEngine;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub member_repo: Arc<dyn MemberRepository>,
    pub schedule_repo: Arc<dyn ScheduleRepository>,
    pub availability_repo: Arc<dyn DayAvailabilityRepository>,
    pub reservation_repo: Arc<dyn ReservationRepository>,
    pub refund_repo: Arc<dyn RefundRepository>,
    pub payment_repo: Arc<dyn PaymentRepository>,
    pub notifier: Arc<dyn Notifier>,
    pub booking_engine: Arc<BookingEngine>,
}
