// service/badge_service.rs
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::{badgedb::BadgeExt, db::DBClient, statsdb::StatsExt},
    models::{
        badgemodel::{BadgeCode, EarnedBadge},
        notificationmodel::NotificationKind,
        socialmodel::ShareEvent,
    },
    service::{
        error::ServiceError,
        notification_service::NotificationService,
        reliability_service::compute_reliability,
        social_service::{milestone_for, SocialService},
    },
};

/// What prompted a badge evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTrigger {
    ShiftCompleted,
    ReviewReceived,
}

#[derive(Debug, Clone)]
pub struct BadgeService {
    db_client: Arc<DBClient>,
    notification_service: Arc<NotificationService>,
    social_service: Arc<SocialService>,
}

impl BadgeService {
    pub fn new(
        db_client: Arc<DBClient>,
        notification_service: Arc<NotificationService>,
        social_service: Arc<SocialService>,
    ) -> Self {
        Self {
            db_client,
            notification_service,
            social_service,
        }
    }

    /// Awards every badge the worker now qualifies for. Badges already held
    /// are skipped by the store, so only new awards are returned.
    pub async fn evaluate_badges(
        &self,
        worker_id: Uuid,
        trigger: BadgeTrigger,
    ) -> Result<Vec<EarnedBadge>, ServiceError> {
        let stats = self.db_client.get_worker_stats(worker_id).await?;
        let reliability = compute_reliability(&stats).map(|r| r.score);

        let mut awarded = Vec::new();
        for code in BadgeCode::earned(&stats, reliability) {
            if let Some(badge) = self.db_client.award_badge(worker_id, code.to_str()).await? {
                tracing::info!("Worker {} earned badge {}", worker_id, badge.code);
                awarded.push(badge);
            }
        }

        for badge in &awarded {
            self.notification_service.notify_quietly(
                worker_id,
                NotificationKind::BadgeEarned,
                "New badge earned",
                format!("You earned the {} badge: {}", badge.name, badge.description),
                Some(serde_json::json!({ "badge_code": badge.code })),
            );
            self.social_service.share_in_background(
                worker_id,
                ShareEvent::BadgeEarned {
                    badge_name: badge.name.clone(),
                },
            );
        }

        if trigger == BadgeTrigger::ShiftCompleted {
            if let Some(event) = milestone_for(stats.completed) {
                self.social_service.share_in_background(worker_id, event);
            }
        }

        Ok(awarded)
    }

    pub fn evaluate_in_background(&self, worker_id: Uuid, trigger: BadgeTrigger) {
        let this = self.clone();
        tokio::spawn(async move {
            if let Err(e) = this.evaluate_badges(worker_id, trigger).await {
                tracing::warn!("Badge evaluation for worker {} failed: {}", worker_id, e);
            }
        });
    }
}
