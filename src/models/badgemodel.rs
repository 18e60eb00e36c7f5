use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::statsmodel::WorkerStats;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Badge {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EarnedBadge {
    pub badge_id: Uuid,
    pub code: String,
    pub name: String,
    pub description: String,
    pub awarded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeCode {
    FirstShift,
    TenShifts,
    FiftyShifts,
    FiveStar,
    Reliable,
    Punctual,
}

impl BadgeCode {
    pub const ALL: [BadgeCode; 6] = [
        BadgeCode::FirstShift,
        BadgeCode::TenShifts,
        BadgeCode::FiftyShifts,
        BadgeCode::FiveStar,
        BadgeCode::Reliable,
        BadgeCode::Punctual,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            BadgeCode::FirstShift => "first_shift",
            BadgeCode::TenShifts => "ten_shifts",
            BadgeCode::FiftyShifts => "fifty_shifts",
            BadgeCode::FiveStar => "five_star",
            BadgeCode::Reliable => "reliable",
            BadgeCode::Punctual => "punctual",
        }
    }

    pub fn is_earned(&self, stats: &WorkerStats, reliability: Option<f64>) -> bool {
        match self {
            BadgeCode::FirstShift => stats.completed >= 1,
            BadgeCode::TenShifts => stats.completed >= 10,
            BadgeCode::FiftyShifts => stats.completed >= 50,
            BadgeCode::FiveStar => stats.five_star_reviews >= 5,
            BadgeCode::Reliable => stats.completed >= 5 && reliability.map_or(false, |r| r >= 4.5),
            BadgeCode::Punctual => {
                stats.check_ins >= 10 && stats.punctual_check_ins == stats.check_ins
            }
        }
    }

    /// Codes the worker qualifies for right now.
    pub fn earned(stats: &WorkerStats, reliability: Option<f64>) -> Vec<BadgeCode> {
        Self::ALL
            .iter()
            .copied()
            .filter(|code| code.is_earned(stats, reliability))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_worker_has_no_badges() {
        assert!(BadgeCode::earned(&WorkerStats::default(), None).is_empty());
    }

    #[test]
    fn shift_milestones() {
        let stats = WorkerStats { completed: 10, ..Default::default() };
        let earned = BadgeCode::earned(&stats, None);
        assert!(earned.contains(&BadgeCode::FirstShift));
        assert!(earned.contains(&BadgeCode::TenShifts));
        assert!(!earned.contains(&BadgeCode::FiftyShifts));
    }

    #[test]
    fn reliable_needs_history_and_score() {
        let few = WorkerStats { completed: 4, ..Default::default() };
        assert!(!BadgeCode::Reliable.is_earned(&few, Some(5.0)));

        let enough = WorkerStats { completed: 5, ..Default::default() };
        assert!(BadgeCode::Reliable.is_earned(&enough, Some(4.5)));
        assert!(!BadgeCode::Reliable.is_earned(&enough, Some(4.49)));
        assert!(!BadgeCode::Reliable.is_earned(&enough, None));
    }

    #[test]
    fn punctual_requires_a_perfect_record() {
        let perfect = WorkerStats { check_ins: 10, punctual_check_ins: 10, ..Default::default() };
        assert!(BadgeCode::Punctual.is_earned(&perfect, None));

        let one_late = WorkerStats { check_ins: 11, punctual_check_ins: 10, ..Default::default() };
        assert!(!BadgeCode::Punctual.is_earned(&one_late, None));
    }
}
