use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Grace period after the scheduled start during which a check-in is on time.
pub const PUNCTUALITY_GRACE_MINUTES: i64 = 10;
/// Worker cancellations with less notice than this count against attendance.
pub const LATE_CANCELLATION_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Accepted,
    Rejected,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn to_str(&self) -> &str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Accepted => "accepted",
            BookingStatus::Rejected => "rejected",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// The only place booking transitions are decided.
    pub fn can_transition_to(&self, to: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, to),
            (Pending, Accepted)
                | (Pending, Rejected)
                | (Pending, Cancelled)
                | (Accepted, InProgress)
                | (Accepted, Cancelled)
                | (InProgress, Completed)
                | (InProgress, Cancelled)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Rejected | BookingStatus::Completed | BookingStatus::Cancelled
        )
    }

    /// Statuses that hold one of the job's slots.
    pub fn occupies_slot(&self) -> bool {
        matches!(
            self,
            BookingStatus::Accepted | BookingStatus::InProgress | BookingStatus::Completed
        )
    }

    /// Statuses under which the worker wallet carries a pending hold.
    pub fn carries_hold(&self) -> bool {
        matches!(self, BookingStatus::Accepted | BookingStatus::InProgress)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub job_id: Uuid,
    pub worker_id: Uuid,
    pub business_id: Uuid,
    pub status: BookingStatus,
    pub amount_cents: i64,
    pub fee_cents: i64,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub checked_out_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<Uuid>,
    pub cancellation_reason_id: Option<Uuid>,
    pub cancellation_note: Option<String>,
    pub late_cancellation: bool,
    pub no_show: bool,
    pub funds_released: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn net_amount_cents(&self) -> i64 {
        self.amount_cents - self.fee_cents
    }

    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.worker_id == user_id || self.business_id == user_id
    }

    /// The other side of the booking, if `user_id` is a participant.
    pub fn counterpart(&self, user_id: Uuid) -> Option<Uuid> {
        if user_id == self.worker_id {
            Some(self.business_id)
        } else if user_id == self.business_id {
            Some(self.worker_id)
        } else {
            None
        }
    }

    pub fn is_punctual_check_in(&self, checked_in_at: DateTime<Utc>) -> bool {
        checked_in_at <= self.starts_at + Duration::minutes(PUNCTUALITY_GRACE_MINUTES)
    }

    pub fn is_late_cancellation(&self, cancelled_by: Uuid, at: DateTime<Utc>) -> bool {
        cancelled_by == self.worker_id
            && self.status.carries_hold()
            && self.starts_at - at < Duration::hours(LATE_CANCELLATION_HOURS)
    }

    pub fn hold_reference(&self) -> String {
        format!("booking:{}:hold", self.id)
    }

    pub fn release_reference(&self) -> String {
        format!("booking:{}:release", self.id)
    }

    pub fn reversal_reference(&self) -> String {
        format!("booking:{}:reverse", self.id)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use BookingStatus::*;

    const ALL: [BookingStatus; 6] = [Pending, Accepted, Rejected, InProgress, Completed, Cancelled];

    pub(crate) fn booking(status: BookingStatus) -> Booking {
        let now = Utc::now();
        Booking {
            id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            worker_id: Uuid::new_v4(),
            business_id: Uuid::new_v4(),
            status,
            amount_cents: 16000,
            fee_cents: 1600,
            starts_at: now + Duration::hours(48),
            ends_at: now + Duration::hours(56),
            checked_in_at: None,
            checked_out_at: None,
            completed_at: None,
            cancelled_at: None,
            cancelled_by: None,
            cancellation_reason_id: None,
            cancellation_note: None,
            late_cancellation: false,
            no_show: false,
            funds_released: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn lifecycle_happy_path_is_allowed() {
        assert!(Pending.can_transition_to(Accepted));
        assert!(Accepted.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Completed));
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for from in ALL.iter().filter(|s| s.is_terminal()) {
            for to in ALL {
                assert!(!from.can_transition_to(to), "{:?} -> {:?}", from, to);
            }
        }
    }

    #[test]
    fn skipping_steps_is_refused() {
        assert!(!Pending.can_transition_to(InProgress));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Accepted.can_transition_to(Completed));
        assert!(!Accepted.can_transition_to(Rejected));
        assert!(!InProgress.can_transition_to(Accepted));
    }

    #[test]
    fn every_live_state_can_be_cancelled() {
        for from in ALL.iter().filter(|s| !s.is_terminal()) {
            assert!(from.can_transition_to(Cancelled));
        }
    }

    #[test]
    fn punctuality_uses_grace_period() {
        let b = booking(InProgress);
        assert!(b.is_punctual_check_in(b.starts_at + Duration::minutes(PUNCTUALITY_GRACE_MINUTES)));
        assert!(!b.is_punctual_check_in(b.starts_at + Duration::minutes(PUNCTUALITY_GRACE_MINUTES + 1)));
        assert!(b.is_punctual_check_in(b.starts_at - Duration::minutes(30)));
    }

    #[test]
    fn late_cancellation_only_for_worker_with_short_notice() {
        let mut b = booking(Accepted);
        b.starts_at = Utc::now() + Duration::hours(3);
        assert!(b.is_late_cancellation(b.worker_id, Utc::now()));
        assert!(!b.is_late_cancellation(b.business_id, Utc::now()));

        b.starts_at = Utc::now() + Duration::hours(72);
        assert!(!b.is_late_cancellation(b.worker_id, Utc::now()));

        let mut pending = booking(Pending);
        pending.starts_at = Utc::now() + Duration::hours(1);
        assert!(!pending.is_late_cancellation(pending.worker_id, Utc::now()));
    }

    #[test]
    fn counterpart_resolves_other_side() {
        let b = booking(Accepted);
        assert_eq!(b.counterpart(b.worker_id), Some(b.business_id));
        assert_eq!(b.counterpart(b.business_id), Some(b.worker_id));
        assert_eq!(b.counterpart(Uuid::new_v4()), None);
    }
}
