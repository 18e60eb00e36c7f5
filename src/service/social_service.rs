// service/social_service.rs
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    db::{db::DBClient, socialdb::SocialExt},
    models::socialmodel::{ShareEvent, SocialConnection, SocialPlatform, SocialPost},
    service::error::ServiceError,
};

/// Completed-shift counts worth announcing.
pub const SHIFT_MILESTONES: [i64; 4] = [10, 25, 50, 100];

#[derive(Debug, Serialize)]
struct SocialWebhookPayload<'a> {
    post_id: Uuid,
    user_id: Uuid,
    platform: &'a str,
    handle: &'a str,
    access_token: Option<&'a str>,
    content: &'a str,
}

#[derive(Debug, Clone)]
pub struct SocialService {
    db_client: Arc<DBClient>,
    http: reqwest::Client,
    webhook_url: Option<String>,
}

impl SocialService {
    pub fn new(db_client: Arc<DBClient>, webhook_url: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            db_client,
            http,
            webhook_url,
        }
    }

    /// Queues one post per matching connection and dispatches each.
    ///
    /// With `auto_only` set, connections that turned off auto-share are
    /// skipped; `platform` narrows the fan-out to a single network.
    pub async fn cross_post(
        &self,
        user_id: Uuid,
        event: &ShareEvent,
        platform: Option<SocialPlatform>,
        auto_only: bool,
    ) -> Result<Vec<SocialPost>, ServiceError> {
        let connections: Vec<SocialConnection> = self
            .db_client
            .get_social_connections(user_id)
            .await?
            .into_iter()
            .filter(|c| !auto_only || c.auto_share)
            .filter(|c| platform.map_or(true, |p| p == c.platform))
            .collect();

        let mut queued = Vec::with_capacity(connections.len());
        for connection in &connections {
            let content = event.compose_for(connection.platform);
            queued.push(self.db_client.queue_social_post(connection, content).await?);
        }

        let posts = join_all(
            connections
                .iter()
                .zip(queued)
                .map(|(connection, post)| self.dispatch(connection, post)),
        )
        .await;

        tracing::info!("Cross-posted to {} platform(s) for user {}", posts.len(), user_id);
        Ok(posts)
    }

    /// Background auto-share that never fails the caller.
    pub fn share_in_background(&self, user_id: Uuid, event: ShareEvent) {
        let this = self.clone();
        tokio::spawn(async move {
            if let Err(e) = this.cross_post(user_id, &event, None, true).await {
                tracing::warn!("Auto-share for user {} failed: {}", user_id, e);
            }
        });
    }

    /// Sends a queued post to the webhook and records the outcome.
    /// Without a webhook the post stays queued.
    async fn dispatch(&self, connection: &SocialConnection, post: SocialPost) -> SocialPost {
        let Some(url) = self.webhook_url.as_deref() else {
            return post;
        };

        let payload = SocialWebhookPayload {
            post_id: post.id,
            user_id: post.user_id,
            platform: connection.platform.to_str(),
            handle: &connection.handle,
            access_token: connection.access_token.as_deref(),
            content: &post.content,
        };

        let outcome = match self.http.post(url).json(&payload).send().await {
            Ok(res) => res.error_for_status().map(|_| ()),
            Err(e) => Err(e),
        };

        let marked = match outcome {
            Ok(()) => self.db_client.mark_social_post(post.id, true, None).await,
            Err(e) => {
                tracing::warn!("Social post {} to {} failed: {}", post.id, connection.platform.to_str(), e);
                self.db_client
                    .mark_social_post(post.id, false, Some(e.to_string()))
                    .await
            }
        };

        match marked {
            Ok(updated) => updated,
            Err(e) => {
                tracing::error!("Could not record outcome of social post {}: {}", post.id, e);
                post
            }
        }
    }
}

/// The milestone reached by exactly this many completed shifts, if any.
pub fn milestone_for(completed_shifts: i64) -> Option<ShareEvent> {
    SHIFT_MILESTONES
        .contains(&completed_shifts)
        .then_some(ShareEvent::ShiftMilestone { completed_shifts })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_exact_milestones_are_announced() {
        assert_eq!(
            milestone_for(10),
            Some(ShareEvent::ShiftMilestone { completed_shifts: 10 })
        );
        assert_eq!(milestone_for(11), None);
        assert_eq!(milestone_for(0), None);
    }

    #[test]
    fn webhook_payload_shape() {
        let payload = SocialWebhookPayload {
            post_id: Uuid::nil(),
            user_id: Uuid::nil(),
            platform: SocialPlatform::X.to_str(),
            handle: "@ada",
            access_token: None,
            content: "hello",
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["platform"], "x");
        assert_eq!(value["handle"], "@ada");
        assert!(value["access_token"].is_null());
    }
}
