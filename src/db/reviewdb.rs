// db/reviewdb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::reviewmodel::Review;

#[async_trait]
pub trait ReviewExt {
    /// Inserts the review and, when the reviewee has a worker profile,
    /// refreshes its average rating in the same transaction.
    async fn create_review(
        &self,
        booking_id: Uuid,
        reviewer_id: Uuid,
        reviewee_id: Uuid,
        rating: i32,
        comment: String,
    ) -> Result<Review, Error>;

    async fn get_review_for_booking(
        &self,
        booking_id: Uuid,
        reviewer_id: Uuid,
    ) -> Result<Option<Review>, Error>;

    async fn get_reviews_for_user(
        &self,
        reviewee_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Review>, Error>;
}

#[async_trait]
impl ReviewExt for DBClient {
    async fn create_review(
        &self,
        booking_id: Uuid,
        reviewer_id: Uuid,
        reviewee_id: Uuid,
        rating: i32,
        comment: String,
    ) -> Result<Review, Error> {
        let mut tx = self.pool.begin().await?;

        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (booking_id, reviewer_id, reviewee_id, rating, comment)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#
        )
        .bind(booking_id)
        .bind(reviewer_id)
        .bind(reviewee_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE worker_profiles wp
            SET rating = agg.avg_rating, rating_count = agg.n, updated_at = NOW()
            FROM (
                SELECT COALESCE(AVG(rating), 0)::DOUBLE PRECISION AS avg_rating, COUNT(*)::INT AS n
                FROM reviews WHERE reviewee_id = $1
            ) agg
            WHERE wp.user_id = $1
            "#
        )
        .bind(reviewee_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(review)
    }

    async fn get_review_for_booking(
        &self,
        booking_id: Uuid,
        reviewer_id: Uuid,
    ) -> Result<Option<Review>, Error> {
        sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE booking_id = $1 AND reviewer_id = $2"
        )
        .bind(booking_id)
        .bind(reviewer_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_reviews_for_user(
        &self,
        reviewee_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Review>, Error> {
        sqlx::query_as::<_, Review>(
            r#"
            SELECT * FROM reviews
            WHERE reviewee_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        )
        .bind(reviewee_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }
}
