use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "social_platform", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SocialPlatform {
    Linkedin,
    X,
    Facebook,
    Instagram,
}

impl SocialPlatform {
    pub fn to_str(&self) -> &'static str {
        match self {
            SocialPlatform::Linkedin => "linkedin",
            SocialPlatform::X => "x",
            SocialPlatform::Facebook => "facebook",
            SocialPlatform::Instagram => "instagram",
        }
    }

    /// Maximum post length in characters.
    pub fn char_limit(&self) -> usize {
        match self {
            SocialPlatform::X => 280,
            SocialPlatform::Linkedin => 3000,
            SocialPlatform::Instagram => 2200,
            SocialPlatform::Facebook => 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SocialConnection {
    pub id: Uuid,
    pub user_id: Uuid,
    pub platform: SocialPlatform,
    pub handle: String,
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
    pub auto_share: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SocialPost {
    pub id: Uuid,
    pub connection_id: Uuid,
    pub user_id: Uuid,
    pub platform: SocialPlatform,
    pub content: String,
    pub status: String,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub posted_at: Option<DateTime<Utc>>,
}

/// Something worth sharing on a worker's social accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareEvent {
    BadgeEarned { badge_name: String },
    ShiftMilestone { completed_shifts: i64 },
}

impl ShareEvent {
    pub fn message(&self) -> String {
        match self {
            ShareEvent::BadgeEarned { badge_name } => {
                format!("I just earned the \"{}\" badge on gigmarket! #gigwork", badge_name)
            }
            ShareEvent::ShiftMilestone { completed_shifts } => {
                format!("{} shifts completed on gigmarket and counting. #gigwork", completed_shifts)
            }
        }
    }

    /// Post text fitted to the platform limit, cut on a char boundary.
    pub fn compose_for(&self, platform: SocialPlatform) -> String {
        let message = self.message();
        let limit = platform.char_limit();
        if message.chars().count() <= limit {
            return message;
        }
        let mut out: String = message.chars().take(limit.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_posts_are_untouched() {
        let event = ShareEvent::ShiftMilestone { completed_shifts: 10 };
        assert_eq!(event.compose_for(SocialPlatform::X), event.message());
    }

    #[test]
    fn long_posts_fit_the_platform_limit() {
        let event = ShareEvent::BadgeEarned { badge_name: "ü".repeat(400) };
        let post = event.compose_for(SocialPlatform::X);
        assert_eq!(post.chars().count(), 280);
        assert!(post.ends_with('…'));

        let linkedin = event.compose_for(SocialPlatform::Linkedin);
        assert_eq!(linkedin, event.message());
    }
}
