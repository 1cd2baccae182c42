use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::domain::models::member::TierPricing;
use crate::domain::services::booking::BookingEngine;
use crate::infra::notify::http_notifier::HttpNotifier;
use crate::state::AppState;
use crate::infra::repositories::{
    postgres_member_repo::PostgresMemberRepo, postgres_schedule_repo::PostgresScheduleRepo,
    postgres_availability_repo::PostgresAvailabilityRepo,
    postgres_reservation_repo::PostgresReservationRepo,
    postgres_refund_repo::PostgresRefundRepo, postgres_payment_repo::PostgresPaymentRepo,
    sqlite_member_repo::SqliteMemberRepo, sqlite_schedule_repo::SqliteScheduleRepo,
    sqlite_availability_repo::SqliteAvailabilityRepo,
    sqlite_reservation_repo::SqliteReservationRepo,
    sqlite_refund_repo::SqliteRefundRepo, sqlite_payment_repo::SqlitePaymentRepo,
};

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;
    let notifier = Arc::new(HttpNotifier::new(
        config.notify_service_url.clone(),
        config.notify_service_token.clone(),
    ));
    let pricing = TierPricing {
        member: config.member_session_price,
        guest: config.guest_session_price,
    };

    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        let member_repo = Arc::new(PostgresMemberRepo::new(pool.clone()));
        let schedule_repo = Arc::new(PostgresScheduleRepo::new(pool.clone()));
        let availability_repo = Arc::new(PostgresAvailabilityRepo::new(pool.clone()));
        let reservation_repo = Arc::new(PostgresReservationRepo::new(pool.clone()));
        let refund_repo = Arc::new(PostgresRefundRepo::new(pool.clone()));
        let payment_repo = Arc::new(PostgresPaymentRepo::new(pool.clone()));

        let booking_engine = Arc::new(BookingEngine::new(
            schedule_repo.clone(),
            availability_repo.clone(),
            reservation_repo.clone(),
            refund_repo.clone(),
            payment_repo.clone(),
            notifier.clone(),
            pricing,
        ));

        AppState {
            config: config.clone(),
            member_repo,
            schedule_repo,
            availability_repo,
            reservation_repo,
            refund_repo,
            payment_repo,
            notifier,
            booking_engine,
        }
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        let member_repo = Arc::new(SqliteMemberRepo::new(pool.clone()));
        let schedule_repo = Arc::new(SqliteScheduleRepo::new(pool.clone()));
        let availability_repo = Arc::new(SqliteAvailabilityRepo::new(pool.clone()));
        let reservation_repo = Arc::new(SqliteReservationRepo::new(pool.clone()));
        let refund_repo = Arc::new(SqliteRefundRepo::new(pool.clone()));
        let payment_repo = Arc::new(SqlitePaymentRepo::new(pool.clone()));

        let booking_engine = Arc::new(BookingEngine::new(
            schedule_repo.clone(),
            availability_repo.clone(),
            reservation_repo.clone(),
            refund_repo.clone(),
            payment_repo.clone(),
            notifier.clone(),
            pricing,
        ));

        AppState {
            config: config.clone(),
            member_repo,
            schedule_repo,
            availability_repo,
            reservation_repo,
            refund_repo,
            payment_repo,
            notifier,
            booking_engine,
        }
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
