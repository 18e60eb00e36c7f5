// db/statsdb.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::{
    bookingmodel::PUNCTUALITY_GRACE_MINUTES,
    statsmodel::{EarningsRow, WorkerStats},
};

#[async_trait]
pub trait StatsExt {
    async fn get_worker_stats(&self, worker_id: Uuid) -> Result<WorkerStats, Error>;

    async fn get_worker_earnings_rows(
        &self,
        worker_id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<EarningsRow>, Error>;

    async fn get_business_spend_rows(
        &self,
        business_id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<EarningsRow>, Error>;
}

#[async_trait]
impl StatsExt for DBClient {
    async fn get_worker_stats(&self, worker_id: Uuid) -> Result<WorkerStats, Error> {
        sqlx::query_as::<_, WorkerStats>(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE b.status = 'completed') AS completed,
                COUNT(*) FILTER (WHERE b.no_show) AS no_shows,
                COUNT(*) FILTER (WHERE b.late_cancellation AND NOT b.no_show) AS late_cancellations,
                COUNT(*) FILTER (WHERE b.checked_in_at IS NOT NULL) AS check_ins,
                COUNT(*) FILTER (
                    WHERE b.checked_in_at IS NOT NULL
                      AND b.checked_in_at <= b.starts_at + make_interval(mins => $2::INT)
                ) AS punctual_check_ins,
                r.review_count,
                r.average_rating,
                r.five_star_reviews
            FROM (
                SELECT
                    COUNT(*) AS review_count,
                    AVG(rating)::DOUBLE PRECISION AS average_rating,
                    COUNT(*) FILTER (WHERE rating = 5) AS five_star_reviews
                FROM reviews WHERE reviewee_id = $1
            ) r
            LEFT JOIN bookings b ON b.worker_id = $1
            GROUP BY r.review_count, r.average_rating, r.five_star_reviews
            "#
        )
        .bind(worker_id)
        .bind(PUNCTUALITY_GRACE_MINUTES as i32)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_worker_earnings_rows(
        &self,
        worker_id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<EarningsRow>, Error> {
        sqlx::query_as::<_, EarningsRow>(
            r#"
            SELECT amount_cents, fee_cents, starts_at, ends_at,
                   checked_in_at, checked_out_at, completed_at
            FROM bookings
            WHERE worker_id = $1
              AND status = 'completed'::booking_status
              AND completed_at IS NOT NULL
              AND ($2::TIMESTAMPTZ IS NULL OR completed_at >= $2)
            ORDER BY completed_at ASC
            "#
        )
        .bind(worker_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_business_spend_rows(
        &self,
        business_id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<EarningsRow>, Error> {
        sqlx::query_as::<_, EarningsRow>(
            r#"
            SELECT amount_cents, fee_cents, starts_at, ends_at,
                   checked_in_at, checked_out_at, completed_at
            FROM bookings
            WHERE business_id = $1
              AND status = 'completed'::booking_status
              AND completed_at IS NOT NULL
              AND ($2::TIMESTAMPTZ IS NULL OR completed_at >= $2)
            ORDER BY completed_at ASC
            "#
        )
        .bind(business_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await
    }
}
