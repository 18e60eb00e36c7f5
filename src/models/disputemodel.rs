use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::money;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "dispute_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DisputeStatus {
    Open,
    UnderReview,
    Resolved,
    Rejected,
}

impl DisputeStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, DisputeStatus::Open | DisputeStatus::UnderReview)
    }

    pub fn can_transition_to(&self, to: DisputeStatus) -> bool {
        use DisputeStatus::*;
        matches!(
            (self, to),
            (Open, UnderReview) | (Open, Resolved) | (Open, Rejected) | (UnderReview, Resolved) | (UnderReview, Rejected)
        )
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "dispute_outcome", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DisputeOutcome {
    ReleaseToWorker,
    RefundBusiness,
    Split,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Dispute {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub raised_by: Uuid,
    pub against: Uuid,
    pub reason: String,
    pub description: String,
    pub status: DisputeStatus,
    pub outcome: Option<DisputeOutcome>,
    pub worker_share_bps: Option<i32>,
    pub resolution_note: Option<String>,
    pub assigned_admin: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// How a pending amount is divided when a dispute closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub release_to_worker: i64,
    pub refund_to_business: i64,
}

impl DisputeOutcome {
    /// Splits `pending_cents` by outcome. The two parts always sum to the input.
    pub fn settle(&self, pending_cents: i64, worker_share_bps: Option<i32>) -> Result<Settlement, String> {
        let pending_cents = pending_cents.max(0);
        let release = match self {
            DisputeOutcome::ReleaseToWorker => pending_cents,
            DisputeOutcome::RefundBusiness => 0,
            DisputeOutcome::Split => {
                let bps = worker_share_bps.ok_or("A split resolution needs worker_share_bps")?;
                if !(0..=10_000).contains(&bps) {
                    return Err("worker_share_bps must be between 0 and 10000".to_string());
                }
                money::share_of(pending_cents, bps as i64)
            }
        };

        Ok(Settlement {
            release_to_worker: release,
            refund_to_business: pending_cents - release,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settlement_parts_sum_to_pending() {
        for outcome in [DisputeOutcome::ReleaseToWorker, DisputeOutcome::RefundBusiness, DisputeOutcome::Split] {
            let s = outcome.settle(14_401, Some(3333)).unwrap();
            assert_eq!(s.release_to_worker + s.refund_to_business, 14_401);
        }
    }

    #[test]
    fn split_needs_valid_share() {
        assert!(DisputeOutcome::Split.settle(1000, None).is_err());
        assert!(DisputeOutcome::Split.settle(1000, Some(10_001)).is_err());
        assert!(DisputeOutcome::Split.settle(1000, Some(-1)).is_err());

        let s = DisputeOutcome::Split.settle(1000, Some(2500)).unwrap();
        assert_eq!(s, Settlement { release_to_worker: 250, refund_to_business: 750 });
    }

    #[test]
    fn release_and_refund_take_everything() {
        assert_eq!(
            DisputeOutcome::ReleaseToWorker.settle(900, None).unwrap(),
            Settlement { release_to_worker: 900, refund_to_business: 0 }
        );
        assert_eq!(
            DisputeOutcome::RefundBusiness.settle(900, None).unwrap(),
            Settlement { release_to_worker: 0, refund_to_business: 900 }
        );
    }

    #[test]
    fn closed_disputes_stay_closed() {
        assert!(DisputeStatus::Open.can_transition_to(DisputeStatus::UnderReview));
        assert!(DisputeStatus::UnderReview.can_transition_to(DisputeStatus::Resolved));
        assert!(!DisputeStatus::Resolved.can_transition_to(DisputeStatus::Open));
        assert!(!DisputeStatus::Rejected.can_transition_to(DisputeStatus::Resolved));
        assert!(!DisputeStatus::UnderReview.can_transition_to(DisputeStatus::Open));
        assert!(DisputeStatus::UnderReview.is_active());
        assert!(!DisputeStatus::Resolved.is_active());
    }
}
