// db/disputedb.rs
use async_trait::async_trait;
use sqlx::{Error, Postgres, Transaction};
use uuid::Uuid;

use super::db::DBClient;
use crate::models::disputemodel::{Dispute, DisputeOutcome, DisputeStatus};

#[async_trait]
pub trait DisputeExt {
    async fn get_dispute_by_id(&self, dispute_id: Uuid) -> Result<Option<Dispute>, Error>;

    async fn get_user_disputes(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Dispute>, Error>;

    async fn get_active_disputes(&self, limit: i64, offset: i64) -> Result<Vec<Dispute>, Error>;

    async fn get_booking_disputes(&self, booking_id: Uuid) -> Result<Vec<Dispute>, Error>;
}

#[async_trait]
impl DisputeExt for DBClient {
    async fn get_dispute_by_id(&self, dispute_id: Uuid) -> Result<Option<Dispute>, Error> {
        sqlx::query_as::<_, Dispute>("SELECT * FROM disputes WHERE id = $1")
            .bind(dispute_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_user_disputes(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Dispute>, Error> {
        sqlx::query_as::<_, Dispute>(
            r#"
            SELECT * FROM disputes
            WHERE raised_by = $1 OR against = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_active_disputes(&self, limit: i64, offset: i64) -> Result<Vec<Dispute>, Error> {
        sqlx::query_as::<_, Dispute>(
            r#"
            SELECT * FROM disputes
            WHERE status IN ('open', 'under_review')
            ORDER BY created_at ASC
            LIMIT $1 OFFSET $2
            "#
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_booking_disputes(&self, booking_id: Uuid) -> Result<Vec<Dispute>, Error> {
        sqlx::query_as::<_, Dispute>(
            "SELECT * FROM disputes WHERE booking_id = $1 ORDER BY created_at DESC"
        )
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await
    }
}

pub async fn find_active_dispute(
    tx: &mut Transaction<'_, Postgres>,
    booking_id: Uuid,
) -> Result<Option<Dispute>, Error> {
    sqlx::query_as::<_, Dispute>(
        r#"
        SELECT * FROM disputes
        WHERE booking_id = $1 AND status IN ('open', 'under_review')
        "#
    )
    .bind(booking_id)
    .fetch_optional(&mut **tx)
    .await
}

pub async fn insert_dispute(
    tx: &mut Transaction<'_, Postgres>,
    booking_id: Uuid,
    raised_by: Uuid,
    against: Uuid,
    reason: String,
    description: String,
) -> Result<Dispute, Error> {
    sqlx::query_as::<_, Dispute>(
        r#"
        INSERT INTO disputes (booking_id, raised_by, against, reason, description)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#
    )
    .bind(booking_id)
    .bind(raised_by)
    .bind(against)
    .bind(reason)
    .bind(description)
    .fetch_one(&mut **tx)
    .await
}

pub async fn lock_dispute(
    tx: &mut Transaction<'_, Postgres>,
    dispute_id: Uuid,
) -> Result<Option<Dispute>, Error> {
    sqlx::query_as::<_, Dispute>("SELECT * FROM disputes WHERE id = $1 FOR UPDATE")
        .bind(dispute_id)
        .fetch_optional(&mut **tx)
        .await
}

pub async fn set_dispute_under_review(
    tx: &mut Transaction<'_, Postgres>,
    dispute_id: Uuid,
    admin_id: Uuid,
) -> Result<Dispute, Error> {
    sqlx::query_as::<_, Dispute>(
        r#"
        UPDATE disputes
        SET status = 'under_review'::dispute_status, assigned_admin = $2
        WHERE id = $1
        RETURNING *
        "#
    )
    .bind(dispute_id)
    .bind(admin_id)
    .fetch_one(&mut **tx)
    .await
}

pub async fn close_dispute(
    tx: &mut Transaction<'_, Postgres>,
    dispute_id: Uuid,
    status: DisputeStatus,
    outcome: Option<DisputeOutcome>,
    worker_share_bps: Option<i32>,
    resolution_note: String,
    admin_id: Uuid,
) -> Result<Dispute, Error> {
    sqlx::query_as::<_, Dispute>(
        r#"
        UPDATE disputes
        SET status = $2,
            outcome = $3,
            worker_share_bps = $4,
            resolution_note = $5,
            assigned_admin = COALESCE(assigned_admin, $6),
            resolved_at = NOW()
        WHERE id = $1
        RETURNING *
        "#
    )
    .bind(dispute_id)
    .bind(status)
    .bind(outcome)
    .bind(worker_share_bps)
    .bind(resolution_note)
    .bind(admin_id)
    .fetch_one(&mut **tx)
    .await
}
