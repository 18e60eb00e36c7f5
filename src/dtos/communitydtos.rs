use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::RequestQueryDto;
use crate::models::socialmodel::SocialPlatform;

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct StartConversationDto {
    pub other_user_id: Uuid,
    pub booking_id: Option<Uuid>,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageDto {
    #[validate(length(min = 1, max = 2000, message = "Message must be 1-2000 characters"))]
    pub content: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate)]
pub struct NotificationQueryDto {
    #[serde(default)]
    pub unread_only: bool,
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u32>,
}

impl NotificationQueryDto {
    pub fn pagination(&self) -> RequestQueryDto {
        RequestQueryDto { page: self.page, limit: self.limit }
    }
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct CreateReviewDto {
    pub booking_id: Uuid,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,
    #[validate(length(max = 1000, message = "Comment must not exceed 1000 characters"))]
    pub comment: Option<String>,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct ConnectSocialDto {
    pub platform: SocialPlatform,
    #[validate(length(min = 1, max = 100, message = "Handle must be 1-100 characters"))]
    pub handle: String,
    pub access_token: Option<String>,
    #[serde(default = "default_auto_share")]
    pub auto_share: bool,
}

fn default_auto_share() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAutoShareDto {
    pub auto_share: bool,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct ShareBadgeDto {
    #[validate(length(min = 1, message = "Badge code is required"))]
    pub badge_code: String,
    pub platform: Option<SocialPlatform>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_range() {
        let mut dto = CreateReviewDto { booking_id: Uuid::new_v4(), rating: 5, comment: None };
        assert!(dto.validate().is_ok());
        dto.rating = 0;
        assert!(dto.validate().is_err());
        dto.rating = 6;
        assert!(dto.validate().is_err());
    }

    #[test]
    fn auto_share_defaults_on() {
        let dto: ConnectSocialDto =
            serde_json::from_value(serde_json::json!({ "platform": "x", "handle": "@ada" })).unwrap();
        assert!(dto.auto_share);
        assert_eq!(dto.platform, SocialPlatform::X);
    }

    #[test]
    fn empty_messages_are_refused() {
        assert!(SendMessageDto { content: String::new() }.validate().is_err());
        assert!(SendMessageDto { content: "hi".into() }.validate().is_ok());
    }
}
