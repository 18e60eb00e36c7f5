// db/badgedb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::badgemodel::{Badge, EarnedBadge};

#[async_trait]
pub trait BadgeExt {
    async fn get_badges(&self) -> Result<Vec<Badge>, Error>;

    async fn get_worker_badges(&self, worker_id: Uuid) -> Result<Vec<EarnedBadge>, Error>;

    /// Awards the badge unless already held. Returns the badge only when newly awarded.
    async fn award_badge(&self, worker_id: Uuid, code: &str) -> Result<Option<EarnedBadge>, Error>;
}

#[async_trait]
impl BadgeExt for DBClient {
    async fn get_badges(&self) -> Result<Vec<Badge>, Error> {
        sqlx::query_as::<_, Badge>("SELECT * FROM badges ORDER BY created_at, code")
            .fetch_all(&self.pool)
            .await
    }

    async fn get_worker_badges(&self, worker_id: Uuid) -> Result<Vec<EarnedBadge>, Error> {
        sqlx::query_as::<_, EarnedBadge>(
            r#"
            SELECT b.id AS badge_id, b.code, b.name, b.description, wb.awarded_at
            FROM worker_badges wb
            JOIN badges b ON b.id = wb.badge_id
            WHERE wb.worker_id = $1
            ORDER BY wb.awarded_at DESC
            "#
        )
        .bind(worker_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn award_badge(&self, worker_id: Uuid, code: &str) -> Result<Option<EarnedBadge>, Error> {
        sqlx::query_as::<_, EarnedBadge>(
            r#"
            WITH awarded AS (
                INSERT INTO worker_badges (worker_id, badge_id)
                SELECT $1, id FROM badges WHERE code = $2
                ON CONFLICT (worker_id, badge_id) DO NOTHING
                RETURNING badge_id, awarded_at
            )
            SELECT b.id AS badge_id, b.code, b.name, b.description, a.awarded_at
            FROM awarded a
            JOIN badges b ON b.id = a.badge_id
            "#
        )
        .bind(worker_id)
        .bind(code)
        .fetch_optional(&self.pool)
        .await
    }
}
