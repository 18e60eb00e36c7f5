// db/cancellationdb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::cancellationmodel::CancellationReason;

#[async_trait]
pub trait CancellationExt {
    async fn get_cancellation_reasons(&self) -> Result<Vec<CancellationReason>, Error>;

    async fn get_cancellation_reason(&self, reason_id: Uuid) -> Result<Option<CancellationReason>, Error>;

    async fn get_cancellation_reason_by_code(&self, code: &str) -> Result<Option<CancellationReason>, Error>;
}

#[async_trait]
impl CancellationExt for DBClient {
    async fn get_cancellation_reasons(&self) -> Result<Vec<CancellationReason>, Error> {
        sqlx::query_as::<_, CancellationReason>(
            "SELECT * FROM cancellation_reasons WHERE is_active = TRUE ORDER BY label"
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn get_cancellation_reason(&self, reason_id: Uuid) -> Result<Option<CancellationReason>, Error> {
        sqlx::query_as::<_, CancellationReason>("SELECT * FROM cancellation_reasons WHERE id = $1")
            .bind(reason_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_cancellation_reason_by_code(&self, code: &str) -> Result<Option<CancellationReason>, Error> {
        sqlx::query_as::<_, CancellationReason>("SELECT * FROM cancellation_reasons WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
    }
}
