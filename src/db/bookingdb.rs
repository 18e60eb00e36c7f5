// db/bookingdb.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Error, Postgres, Transaction};
use uuid::Uuid;

use super::db::DBClient;
use crate::models::bookingmodel::{Booking, BookingStatus};

#[async_trait]
pub trait BookingExt {
    async fn get_booking_by_id(&self, booking_id: Uuid) -> Result<Option<Booking>, Error>;

    async fn get_worker_bookings(
        &self,
        worker_id: Uuid,
        status: Option<BookingStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Booking>, Error>;

    async fn get_business_bookings(
        &self,
        business_id: Uuid,
        status: Option<BookingStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Booking>, Error>;

    async fn get_job_bookings(&self, job_id: Uuid) -> Result<Vec<Booking>, Error>;

    async fn has_overlapping_booking(
        &self,
        worker_id: Uuid,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        exclude_booking: Option<Uuid>,
    ) -> Result<bool, Error>;

    /// Completed bookings still holding pending funds whose dispute window
    /// has passed and that have no active dispute.
    async fn get_bookings_due_for_release(
        &self,
        window_hours: i64,
        skip: &[Uuid],
        limit: i64,
    ) -> Result<Vec<Booking>, Error>;

    async fn get_cancelled_bookings_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Booking>, Error>;
}

#[async_trait]
impl BookingExt for DBClient {
    async fn get_booking_by_id(&self, booking_id: Uuid) -> Result<Option<Booking>, Error> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_worker_bookings(
        &self,
        worker_id: Uuid,
        status: Option<BookingStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Booking>, Error> {
        sqlx::query_as::<_, Booking>(
            r#"
            SELECT * FROM bookings
            WHERE worker_id = $1
              AND ($2::booking_status IS NULL OR status = $2)
            ORDER BY starts_at DESC
            LIMIT $3 OFFSET $4
            "#
        )
        .bind(worker_id)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_business_bookings(
        &self,
        business_id: Uuid,
        status: Option<BookingStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Booking>, Error> {
        sqlx::query_as::<_, Booking>(
            r#"
            SELECT * FROM bookings
            WHERE business_id = $1
              AND ($2::booking_status IS NULL OR status = $2)
            ORDER BY starts_at DESC
            LIMIT $3 OFFSET $4
            "#
        )
        .bind(business_id)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_job_bookings(&self, job_id: Uuid) -> Result<Vec<Booking>, Error> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE job_id = $1 ORDER BY created_at ASC"
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn has_overlapping_booking(
        &self,
        worker_id: Uuid,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        exclude_booking: Option<Uuid>,
    ) -> Result<bool, Error> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM bookings
                WHERE worker_id = $1
                  AND status IN ('accepted', 'in_progress')
                  AND starts_at < $3
                  AND ends_at > $2
                  AND ($4::UUID IS NULL OR id <> $4)
            )
            "#
        )
        .bind(worker_id)
        .bind(starts_at)
        .bind(ends_at)
        .bind(exclude_booking)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_bookings_due_for_release(
        &self,
        window_hours: i64,
        skip: &[Uuid],
        limit: i64,
    ) -> Result<Vec<Booking>, Error> {
        sqlx::query_as::<_, Booking>(
            r#"
            SELECT b.* FROM bookings b
            WHERE b.status = 'completed'::booking_status
              AND b.funds_released = FALSE
              AND b.completed_at < NOW() - $1::FLOAT8 * INTERVAL '1 hour'
              AND NOT (b.id = ANY($2))
              AND NOT EXISTS (
                  SELECT 1 FROM disputes d
                  WHERE d.booking_id = b.id
                    AND d.status IN ('open', 'under_review')
              )
            ORDER BY b.completed_at ASC
            LIMIT $3
            "#
        )
        .bind(window_hours as f64)
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_cancelled_bookings_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Booking>, Error> {
        sqlx::query_as::<_, Booking>(
            r#"
            SELECT * FROM bookings
            WHERE status = 'cancelled'::booking_status
              AND (worker_id = $1 OR business_id = $1)
            ORDER BY cancelled_at DESC NULLS LAST
            LIMIT $2 OFFSET $3
            "#
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }
}

pub async fn insert_booking(
    tx: &mut Transaction<'_, Postgres>,
    job_id: Uuid,
    worker_id: Uuid,
    business_id: Uuid,
    amount_cents: i64,
    fee_cents: i64,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
) -> Result<Booking, Error> {
    sqlx::query_as::<_, Booking>(
        r#"
        INSERT INTO bookings
        (job_id, worker_id, business_id, amount_cents, fee_cents, starts_at, ends_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#
    )
    .bind(job_id)
    .bind(worker_id)
    .bind(business_id)
    .bind(amount_cents)
    .bind(fee_cents)
    .bind(starts_at)
    .bind(ends_at)
    .fetch_one(&mut **tx)
    .await
}

/// Locks the booking row for the rest of the transaction.
pub async fn lock_booking(
    tx: &mut Transaction<'_, Postgres>,
    booking_id: Uuid,
) -> Result<Option<Booking>, Error> {
    sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
        .bind(booking_id)
        .fetch_optional(&mut **tx)
        .await
}

pub async fn set_booking_status(
    tx: &mut Transaction<'_, Postgres>,
    booking_id: Uuid,
    status: BookingStatus,
) -> Result<Booking, Error> {
    sqlx::query_as::<_, Booking>(
        r#"
        UPDATE bookings
        SET status = $2,
            checked_in_at = CASE WHEN $2 = 'in_progress'::booking_status THEN NOW() ELSE checked_in_at END,
            checked_out_at = CASE WHEN $2 = 'completed'::booking_status THEN NOW() ELSE checked_out_at END,
            completed_at = CASE WHEN $2 = 'completed'::booking_status THEN NOW() ELSE completed_at END,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#
    )
    .bind(booking_id)
    .bind(status)
    .fetch_one(&mut **tx)
    .await
}

pub async fn set_booking_cancelled(
    tx: &mut Transaction<'_, Postgres>,
    booking_id: Uuid,
    cancelled_by: Uuid,
    reason_id: Uuid,
    note: Option<String>,
    late_cancellation: bool,
    no_show: bool,
) -> Result<Booking, Error> {
    sqlx::query_as::<_, Booking>(
        r#"
        UPDATE bookings
        SET status = 'cancelled'::booking_status,
            cancelled_at = NOW(),
            cancelled_by = $2,
            cancellation_reason_id = $3,
            cancellation_note = $4,
            late_cancellation = $5,
            no_show = $6,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#
    )
    .bind(booking_id)
    .bind(cancelled_by)
    .bind(reason_id)
    .bind(note)
    .bind(late_cancellation)
    .bind(no_show)
    .fetch_one(&mut **tx)
    .await
}

pub async fn set_funds_released(
    tx: &mut Transaction<'_, Postgres>,
    booking_id: Uuid,
) -> Result<Booking, Error> {
    sqlx::query_as::<_, Booking>(
        r#"
        UPDATE bookings SET funds_released = TRUE, updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#
    )
    .bind(booking_id)
    .fetch_one(&mut **tx)
    .await
}

/// Overlap check run inside the accepting transaction, after the worker's
/// wallet row is locked, so concurrent accepts for one worker serialize.
pub async fn worker_has_overlap(
    tx: &mut Transaction<'_, Postgres>,
    worker_id: Uuid,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    exclude_booking: Uuid,
) -> Result<bool, Error> {
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM bookings
            WHERE worker_id = $1
              AND status IN ('accepted', 'in_progress')
              AND starts_at < $3
              AND ends_at > $2
              AND id <> $4
        )
        "#
    )
    .bind(worker_id)
    .bind(starts_at)
    .bind(ends_at)
    .bind(exclude_booking)
    .fetch_one(&mut **tx)
    .await
}
