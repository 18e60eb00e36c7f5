use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub title: String,
    pub body: String,
    pub data: Option<serde_json::Value>,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    BookingRequested,
    BookingAccepted,
    BookingRejected,
    BookingStarted,
    BookingCompleted,
    BookingCancelled,
    FundsReleased,
    DisputeOpened,
    DisputeResolved,
    NewMessage,
    NewReview,
    BadgeEarned,
}

impl NotificationKind {
    pub fn to_str(&self) -> &'static str {
        match self {
            NotificationKind::BookingRequested => "booking_requested",
            NotificationKind::BookingAccepted => "booking_accepted",
            NotificationKind::BookingRejected => "booking_rejected",
            NotificationKind::BookingStarted => "booking_started",
            NotificationKind::BookingCompleted => "booking_completed",
            NotificationKind::BookingCancelled => "booking_cancelled",
            NotificationKind::FundsReleased => "funds_released",
            NotificationKind::DisputeOpened => "dispute_opened",
            NotificationKind::DisputeResolved => "dispute_resolved",
            NotificationKind::NewMessage => "new_message",
            NotificationKind::NewReview => "new_review",
            NotificationKind::BadgeEarned => "badge_earned",
        }
    }
}
