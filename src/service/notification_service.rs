// service/notification_service.rs
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use uuid::Uuid;

use crate::{
    db::{db::DBClient, notificationdb::NotificationExt},
    models::notificationmodel::{Notification, NotificationKind},
    service::error::ServiceError,
};

/// Body sent to the push webhook.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PushPayload {
    pub user_id: Uuid,
    pub title: String,
    pub body: String,
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct NotificationService {
    db_client: Arc<DBClient>,
    http: reqwest::Client,
    push_webhook_url: Option<String>,
    push_webhook_token: Option<String>,
}

impl NotificationService {
    pub fn new(
        db_client: Arc<DBClient>,
        push_webhook_url: Option<String>,
        push_webhook_token: Option<String>,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            db_client,
            http,
            push_webhook_url,
            push_webhook_token,
        }
    }

    /// Stores the notification, then hands the push off to a background task.
    pub async fn notify(
        &self,
        user_id: Uuid,
        kind: NotificationKind,
        title: impl Into<String>,
        body: impl Into<String>,
        data: Option<serde_json::Value>,
    ) -> Result<Notification, ServiceError> {
        let notification = self
            .db_client
            .create_notification(user_id, kind.to_str(), title.into(), body.into(), data)
            .await?;

        tracing::info!(
            "Notification {} ({}) stored for user {}",
            notification.id,
            notification.kind,
            user_id
        );

        let payload = PushPayload {
            user_id,
            title: notification.title.clone(),
            body: notification.body.clone(),
            data: notification.data.clone(),
        };
        let this = self.clone();
        tokio::spawn(async move {
            if let Err(e) = this.send_push(&payload).await {
                tracing::warn!("Push delivery to user {} failed: {}", payload.user_id, e);
            }
        });

        Ok(notification)
    }

    /// Fire-and-forget variant for side effects that must never fail the caller.
    pub fn notify_quietly(
        &self,
        user_id: Uuid,
        kind: NotificationKind,
        title: impl Into<String>,
        body: impl Into<String>,
        data: Option<serde_json::Value>,
    ) {
        let this = self.clone();
        let title = title.into();
        let body = body.into();
        tokio::spawn(async move {
            if let Err(e) = this.notify(user_id, kind, title, body, data).await {
                tracing::warn!(
                    "Dropping {} notification for user {}: {}",
                    kind.to_str(),
                    user_id,
                    e
                );
            }
        });
    }

    /// Posts to the push webhook. Returns `false` when no webhook is configured.
    pub async fn send_push(&self, payload: &PushPayload) -> Result<bool, reqwest::Error> {
        let Some(url) = self.push_webhook_url.as_deref() else {
            return Ok(false);
        };

        let mut request = self.http.post(url).json(payload);
        if let Some(token) = self.push_webhook_token.as_deref() {
            request = request.bearer_auth(token);
        }

        request.send().await?.error_for_status()?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    #[tokio::test]
    async fn push_is_skipped_without_webhook() {
        let pool = PgPool::connect_lazy("postgres://localhost/gigmarket").unwrap();
        let service = NotificationService::new(Arc::new(DBClient::new(pool)), None, None);

        let payload = PushPayload {
            user_id: Uuid::new_v4(),
            title: "Booking accepted".into(),
            body: "See you Saturday".into(),
            data: None,
        };

        assert!(!service.send_push(&payload).await.unwrap());
    }

    #[test]
    fn payload_serializes_expected_fields() {
        let user_id = Uuid::nil();
        let payload = PushPayload {
            user_id,
            title: "t".into(),
            body: "b".into(),
            data: Some(serde_json::json!({ "booking_id": "x" })),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["user_id"], serde_json::json!(user_id.to_string()));
        assert_eq!(value["data"]["booking_id"], "x");
    }
}
