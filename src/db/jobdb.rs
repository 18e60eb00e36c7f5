// db/jobdb.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Error, Postgres, Transaction};
use uuid::Uuid;

use super::db::DBClient;
use crate::models::jobmodel::{Job, JobStatus};

#[async_trait]
pub trait JobExt {
    async fn create_job(
        &self,
        business_id: Uuid,
        title: String,
        description: String,
        role: String,
        city: String,
        address: String,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        hourly_rate_cents: i64,
        slots: i32,
    ) -> Result<Job, Error>;

    async fn get_job_by_id(&self, job_id: Uuid) -> Result<Option<Job>, Error>;

    async fn get_open_jobs(
        &self,
        city: Option<&str>,
        role: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Job>, Error>;

    async fn get_business_jobs(
        &self,
        business_id: Uuid,
        status: Option<JobStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Job>, Error>;

    async fn update_job_status(&self, job_id: Uuid, status: JobStatus) -> Result<Job, Error>;
}

#[async_trait]
impl JobExt for DBClient {
    async fn create_job(
        &self,
        business_id: Uuid,
        title: String,
        description: String,
        role: String,
        city: String,
        address: String,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        hourly_rate_cents: i64,
        slots: i32,
    ) -> Result<Job, Error> {
        sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs
            (business_id, title, description, role, city, address, starts_at, ends_at, hourly_rate_cents, slots)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#
        )
        .bind(business_id)
        .bind(title)
        .bind(description)
        .bind(role)
        .bind(city)
        .bind(address)
        .bind(starts_at)
        .bind(ends_at)
        .bind(hourly_rate_cents)
        .bind(slots)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_job_by_id(&self, job_id: Uuid) -> Result<Option<Job>, Error> {
        sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1")
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_open_jobs(
        &self,
        city: Option<&str>,
        role: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Job>, Error> {
        sqlx::query_as::<_, Job>(
            r#"
            SELECT * FROM jobs
            WHERE status = 'open'::job_status
              AND starts_at > NOW()
              AND ($1::TEXT IS NULL OR LOWER(city) = LOWER($1))
              AND ($2::TEXT IS NULL OR LOWER(role) = LOWER($2))
            ORDER BY starts_at ASC
            LIMIT $3 OFFSET $4
            "#
        )
        .bind(city)
        .bind(role)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_business_jobs(
        &self,
        business_id: Uuid,
        status: Option<JobStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Job>, Error> {
        sqlx::query_as::<_, Job>(
            r#"
            SELECT * FROM jobs
            WHERE business_id = $1
              AND ($2::job_status IS NULL OR status = $2)
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

    async fn update_job_status(&self, job_id: Uuid, status: JobStatus) -> Result<Job, Error> {
        sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(job_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await
    }
}

/// Locks the job row for the rest of the transaction.
pub async fn lock_job(
    tx: &mut Transaction<'_, Postgres>,
    job_id: Uuid,
) -> Result<Option<Job>, Error> {
    sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1 FOR UPDATE")
        .bind(job_id)
        .fetch_optional(&mut **tx)
        .await
}

/// Moves a job between `open` and `filled` to match its occupied slots.
/// Closed and cancelled jobs are left alone.
pub async fn sync_job_fill_status(
    tx: &mut Transaction<'_, Postgres>,
    job_id: Uuid,
) -> Result<(), Error> {
    sqlx::query(
        r#"
        UPDATE jobs j
        SET status = CASE
                WHEN occupied.n >= j.slots THEN 'filled'::job_status
                ELSE 'open'::job_status
            END,
            updated_at = NOW()
        FROM (
            SELECT COUNT(*) AS n FROM bookings
            WHERE job_id = $1
              AND status IN ('accepted', 'in_progress', 'completed')
        ) occupied
        WHERE j.id = $1
          AND j.status IN ('open', 'filled')
        "#
    )
    .bind(job_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
