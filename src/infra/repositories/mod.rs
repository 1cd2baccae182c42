pub mod sqlite_member_repo;
pub mod sqlite_schedule_repo;
pub mod sqlite_availability_repo;
pub mod sqlite_reservation_repo;
pub mod sqlite_refund_repo;
pub mod sqlite_payment_repo;
pub mod postgres_member_repo;
pub mod postgres_schedule_repo;
pub mod postgres_availability_repo;
pub mod postgres_reservation_repo;
pub mod postgres_refund_repo;
pub mod postgres_payment_repo;
