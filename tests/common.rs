use swimclub_backend::{
    api::router::create_router,
    state::AppState,
    config::Config,
    domain::models::member::{Member, TierPricing},
    domain::models::notification::{BatchConfirmation, ReleaseConfirmation},
    domain::models::schedule::{NewScheduleParams, Schedule},
    domain::ports::Notifier,
    domain::services::booking::BookingEngine,
    error::AppError,
    infra::repositories::{
        sqlite_member_repo::SqliteMemberRepo,
        sqlite_schedule_repo::SqliteScheduleRepo,
        sqlite_availability_repo::SqliteAvailabilityRepo,
        sqlite_reservation_repo::SqliteReservationRepo,
        sqlite_refund_repo::SqliteRefundRepo,
        sqlite_payment_repo::SqlitePaymentRepo,
    },
};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use axum::Router;
use chrono::{Datelike, Duration, NaiveDate, Utc};
use uuid::Uuid;

pub struct MockNotifier {
    pub batch_calls: Mutex<Vec<BatchConfirmation>>,
    pub release_calls: Mutex<Vec<ReleaseConfirmation>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            batch_calls: Mutex::new(Vec::new()),
            release_calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send_batch_confirmation(&self, _member: &Member, details: &BatchConfirmation) -> Result<(), AppError> {
        self.batch_calls.lock().unwrap().push(details.clone());
        Ok(())
    }

    async fn send_release_confirmation(&self, _member: &Member, details: &ReleaseConfirmation) -> Result<(), AppError> {
        self.release_calls.lock().unwrap().push(details.clone());
        Ok(())
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub notifier: Arc<MockNotifier>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        // a single connection keeps SQLite writers serialized under
        // concurrent requests
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            notify_service_url: "http://localhost".to_string(),
            notify_service_token: "token".to_string(),
            member_session_price: 7000,
            guest_session_price: 10000,
        };

        let member_repo = Arc::new(SqliteMemberRepo::new(pool.clone()));
        let schedule_repo = Arc::new(SqliteScheduleRepo::new(pool.clone()));
        let availability_repo = Arc::new(SqliteAvailabilityRepo::new(pool.clone()));
        let reservation_repo = Arc::new(SqliteReservationRepo::new(pool.clone()));
        let refund_repo = Arc::new(SqliteRefundRepo::new(pool.clone()));
        let payment_repo = Arc::new(SqlitePaymentRepo::new(pool.clone()));
        let notifier = Arc::new(MockNotifier::new());

        let booking_engine = Arc::new(BookingEngine::new(
            schedule_repo.clone(),
            availability_repo.clone(),
            reservation_repo.clone(),
            refund_repo.clone(),
            payment_repo.clone(),
            notifier.clone(),
            TierPricing {
                member: config.member_session_price,
                guest: config.guest_session_price,
            },
        ));

        let state = Arc::new(AppState {
            config,
            member_repo,
            schedule_repo,
            availability_repo,
            reservation_repo,
            refund_repo,
            payment_repo,
            notifier: notifier.clone(),
            booking_engine,
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            notifier,
        }
    }

    pub async fn seed_admin(&self) -> Member {
        let mut admin = Member::new(
            "Admin".to_string(),
            "admin@swimclub.test".to_string(),
            "MEMBER".to_string(),
        );
        admin.role = "ADMIN".to_string();
        self.state.member_repo.create(&admin).await.expect("Failed to seed admin")
    }

    pub async fn seed_member(&self, name: &str, membership: &str) -> Member {
        let member = Member::new(
            name.to_string(),
            format!("{}@swimclub.test", name.to_lowercase()),
            membership.to_string(),
        );
        self.state.member_repo.create(&member).await.expect("Failed to seed member")
    }

    pub async fn seed_schedule(&self, day_of_week: i32, default_capacity: i32) -> Schedule {
        self.state.booking_engine.create_schedule(NewScheduleParams {
            day_of_week,
            start_time: "06:00".to_string(),
            end_time: "07:00".to_string(),
            default_capacity,
            lane_count: 5,
        }).await.expect("Failed to seed schedule")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}

/// Every date of the month after the current one whose weekday matches
/// `day_of_week` (0 = Monday .. 6 = Sunday).
#[allow(dead_code)]
pub fn next_month_dates_for_weekday(day_of_week: i32) -> Vec<NaiveDate> {
    let today = Utc::now().date_naive();
    let (year, month) = if today.month() == 12 {
        (today.year() + 1, 1)
    } else {
        (today.year(), today.month() + 1)
    };

    let mut dates = Vec::new();
    let mut cursor = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
    while cursor.month() == month {
        if cursor.weekday().num_days_from_monday() as i32 == day_of_week {
            dates.push(cursor);
        }
        cursor += Duration::days(1);
    }
    dates
}

/// First date of the current month with the given weekday.
#[allow(dead_code)]
pub fn current_month_date_for_weekday(day_of_week: i32) -> NaiveDate {
    let today = Utc::now().date_naive();
    let mut cursor = NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap();
    while cursor.weekday().num_days_from_monday() as i32 != day_of_week {
        cursor += Duration::days(1);
    }
    cursor
}

#[allow(dead_code)]
pub fn fmt_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
