// service/test_support.rs
//! Fixtures for tests that run against Postgres. They are skipped when
//! `DATABASE_URL` is not set.
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use crate::{
    config::Config,
    db::{db::DBClient, jobdb::JobExt, profiledb::ProfileExt, userdb::UserExt},
    models::{
        bookingmodel::Booking,
        jobmodel::Job,
        usermodel::{User, UserRole},
    },
    AppState,
};

/// App state over a fresh pool of `max_connections`, with migrations applied.
pub async fn test_state(max_connections: u32) -> Option<Arc<AppState>> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping database test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(&database_url)
        .await
        .expect("connect to test database");
    let db_client = DBClient::new(pool);
    db_client.migrate().await.expect("run migrations");

    let config = Config {
        database_url,
        ..Config::for_tests()
    };
    Some(Arc::new(AppState::new(db_client, config)))
}

pub async fn user(state: &AppState, role: UserRole) -> User {
    state
        .db_client
        .save_user(
            format!("{:?} test", role),
            format!("{}@test.gigmarket", Uuid::new_v4()),
            "not-a-real-hash".to_string(),
            role,
        )
        .await
        .expect("save user")
}

/// A worker who passes every compliance check.
pub async fn compliant_worker(state: &AppState) -> User {
    let worker = user(state, UserRole::Worker).await;
    state
        .db_client
        .upsert_worker_profile(
            worker.id,
            "Barista".into(),
            String::new(),
            vec!["coffee".into()],
            Some(1800),
            Some("+2348000000000".into()),
            "Lagos".into(),
        )
        .await
        .expect("worker profile");
    state
        .db_client
        .set_worker_flags(worker.id, Some(true), None)
        .await
        .expect("verify worker");
    worker
}

pub async fn job(state: &AppState, business: &User, starts_at: DateTime<Utc>, length: Duration, rate_cents: i64) -> Job {
    state
        .db_client
        .create_job(
            business.id,
            "Barista".into(),
            "Morning shift".into(),
            "barista".into(),
            "Lagos".into(),
            "1 Market St".into(),
            starts_at,
            starts_at + length,
            rate_cents,
            1,
        )
        .await
        .expect("create job")
}

/// An eight-hour shift starting tomorrow at $20.00/h.
pub async fn standard_job(state: &AppState, business: &User) -> Job {
    job(state, business, Utc::now() + Duration::days(1), Duration::hours(8), 2000).await
}

/// Applies and accepts, so the worker's net pay is on hold.
pub async fn accepted_booking(state: &AppState) -> (User, User, Booking) {
    let worker = compliant_worker(state).await;
    let business = user(state, UserRole::Business).await;
    let job = standard_job(state, &business).await;

    let pending = state.booking_service.apply(&worker, job.id).await.expect("apply");
    let accepted = state
        .booking_service
        .accept(&business, pending.id)
        .await
        .expect("accept");
    (worker, business, accepted)
}

/// Marks an accepted booking completed `ago` in the past.
pub async fn complete_booking(state: &AppState, booking_id: Uuid, ago: Duration) -> Booking {
    let completed_at = Utc::now() - ago;
    sqlx::query_as::<_, Booking>(
        r#"
        UPDATE bookings
        SET status = 'completed'::booking_status,
            checked_in_at = $2, checked_out_at = $2, completed_at = $2,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#
    )
    .bind(booking_id)
    .bind(completed_at)
    .fetch_one(&state.db_client.pool)
    .await
    .expect("complete booking")
}
