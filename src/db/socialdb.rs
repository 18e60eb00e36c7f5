// db/socialdb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::socialmodel::{SocialConnection, SocialPlatform, SocialPost};

#[async_trait]
pub trait SocialExt {
    async fn upsert_social_connection(
        &self,
        user_id: Uuid,
        platform: SocialPlatform,
        handle: String,
        access_token: Option<String>,
        auto_share: bool,
    ) -> Result<SocialConnection, Error>;

    async fn get_social_connections(&self, user_id: Uuid) -> Result<Vec<SocialConnection>, Error>;

    async fn get_social_connection(
        &self,
        user_id: Uuid,
        platform: SocialPlatform,
    ) -> Result<Option<SocialConnection>, Error>;

    async fn set_auto_share(
        &self,
        user_id: Uuid,
        platform: SocialPlatform,
        auto_share: bool,
    ) -> Result<Option<SocialConnection>, Error>;

    async fn delete_social_connection(&self, user_id: Uuid, platform: SocialPlatform) -> Result<bool, Error>;

    async fn queue_social_post(
        &self,
        connection: &SocialConnection,
        content: String,
    ) -> Result<SocialPost, Error>;

    async fn mark_social_post(
        &self,
        post_id: Uuid,
        posted: bool,
        error: Option<String>,
    ) -> Result<SocialPost, Error>;

    async fn get_social_posts(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SocialPost>, Error>;
}

#[async_trait]
impl SocialExt for DBClient {
    async fn upsert_social_connection(
        &self,
        user_id: Uuid,
        platform: SocialPlatform,
        handle: String,
        access_token: Option<String>,
        auto_share: bool,
    ) -> Result<SocialConnection, Error> {
        sqlx::query_as::<_, SocialConnection>(
            r#"
            INSERT INTO social_connections (user_id, platform, handle, access_token, auto_share)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, platform) DO UPDATE SET
                handle = EXCLUDED.handle,
                access_token = COALESCE(EXCLUDED.access_token, social_connections.access_token),
                auto_share = EXCLUDED.auto_share,
                updated_at = NOW()
            RETURNING *
            "#
        )
        .bind(user_id)
        .bind(platform)
        .bind(handle)
        .bind(access_token)
        .bind(auto_share)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_social_connections(&self, user_id: Uuid) -> Result<Vec<SocialConnection>, Error> {
        sqlx::query_as::<_, SocialConnection>(
            "SELECT * FROM social_connections WHERE user_id = $1 ORDER BY created_at"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_social_connection(
        &self,
        user_id: Uuid,
        platform: SocialPlatform,
    ) -> Result<Option<SocialConnection>, Error> {
        sqlx::query_as::<_, SocialConnection>(
            "SELECT * FROM social_connections WHERE user_id = $1 AND platform = $2"
        )
        .bind(user_id)
        .bind(platform)
        .fetch_optional(&self.pool)
        .await
    }

    async fn set_auto_share(
        &self,
        user_id: Uuid,
        platform: SocialPlatform,
        auto_share: bool,
    ) -> Result<Option<SocialConnection>, Error> {
        sqlx::query_as::<_, SocialConnection>(
            r#"
            UPDATE social_connections SET auto_share = $3, updated_at = NOW()
            WHERE user_id = $1 AND platform = $2
            RETURNING *
            "#
        )
        .bind(user_id)
        .bind(platform)
        .bind(auto_share)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_social_connection(&self, user_id: Uuid, platform: SocialPlatform) -> Result<bool, Error> {
        let result = sqlx::query(
            "DELETE FROM social_connections WHERE user_id = $1 AND platform = $2"
        )
        .bind(user_id)
        .bind(platform)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn queue_social_post(
        &self,
        connection: &SocialConnection,
        content: String,
    ) -> Result<SocialPost, Error> {
        sqlx::query_as::<_, SocialPost>(
            r#"
            INSERT INTO social_posts (connection_id, user_id, platform, content)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#
        )
        .bind(connection.id)
        .bind(connection.user_id)
        .bind(connection.platform)
        .bind(content)
        .fetch_one(&self.pool)
        .await
    }

    async fn mark_social_post(
        &self,
        post_id: Uuid,
        posted: bool,
        error: Option<String>,
    ) -> Result<SocialPost, Error> {
        sqlx::query_as::<_, SocialPost>(
            r#"
            UPDATE social_posts
            SET status = CASE WHEN $2 THEN 'posted' ELSE 'failed' END,
                error = $3,
                posted_at = CASE WHEN $2 THEN NOW() ELSE NULL END
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(post_id)
        .bind(posted)
        .bind(error)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_social_posts(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SocialPost>, Error> {
        sqlx::query_as::<_, SocialPost>(
            r#"
            SELECT * FROM social_posts
            WHERE user_id = $1
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
}
