use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregates over a worker's booking and review history.
#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct WorkerStats {
    pub completed: i64,
    pub no_shows: i64,
    pub late_cancellations: i64,
    pub check_ins: i64,
    pub punctual_check_ins: i64,
    pub review_count: i64,
    pub average_rating: Option<f64>,
    pub five_star_reviews: i64,
}

/// One completed booking as seen by the earnings report.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EarningsRow {
    pub amount_cents: i64,
    pub fee_cents: i64,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub checked_out_at: Option<DateTime<Utc>>,
    pub completed_at: DateTime<Utc>,
}

impl EarningsRow {
    /// Worked minutes, from check-in/out when both exist, otherwise the schedule.
    pub fn worked_minutes(&self) -> i64 {
        match (self.checked_in_at, self.checked_out_at) {
            (Some(start), Some(end)) if end > start => (end - start).num_minutes(),
            _ => (self.ends_at - self.starts_at).num_minutes().max(0),
        }
    }
}
