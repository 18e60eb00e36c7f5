// service/reliability_service.rs
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::{
    db::{db::DBClient, statsdb::StatsExt},
    models::statsmodel::WorkerStats,
    service::error::ServiceError,
};

const ATTENDANCE_WEIGHT: f64 = 0.4;
const PUNCTUALITY_WEIGHT: f64 = 0.3;
const RATING_WEIGHT: f64 = 0.3;
const MIN_SCORE: f64 = 1.0;
const MAX_SCORE: f64 = 5.0;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReliabilityScore {
    pub score: f64,
    pub attendance_rate: f64,
    pub punctuality_rate: f64,
    pub average_rating: f64,
    pub finished_bookings: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReliabilityReport {
    pub worker_id: Uuid,
    pub reliability: Option<ReliabilityScore>,
    pub stats: WorkerStats,
}

/// Maps a 0..=1 rate onto the 1..=5 scale.
fn to_scale(rate: f64) -> f64 {
    MIN_SCORE + (MAX_SCORE - MIN_SCORE) * rate
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Score on a 1-5 scale. `None` until the worker has finished a booking.
pub fn compute_reliability(stats: &WorkerStats) -> Option<ReliabilityScore> {
    let finished = stats.completed + stats.no_shows + stats.late_cancellations;
    if finished <= 0 {
        return None;
    }

    let attendance = stats.completed as f64 / finished as f64;
    let punctuality = if stats.check_ins > 0 {
        stats.punctual_check_ins as f64 / stats.check_ins as f64
    } else {
        attendance
    };
    let rating = stats
        .average_rating
        .filter(|r| r.is_finite())
        .unwrap_or(MAX_SCORE)
        .clamp(MIN_SCORE, MAX_SCORE);

    let raw = ATTENDANCE_WEIGHT * to_scale(attendance)
        + PUNCTUALITY_WEIGHT * to_scale(punctuality)
        + RATING_WEIGHT * rating;

    Some(ReliabilityScore {
        score: round2(raw).clamp(MIN_SCORE, MAX_SCORE),
        attendance_rate: round2(attendance),
        punctuality_rate: round2(punctuality),
        average_rating: round2(rating),
        finished_bookings: finished,
    })
}

#[derive(Debug, Clone)]
pub struct ReliabilityService {
    db_client: Arc<DBClient>,
}

impl ReliabilityService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn report(&self, worker_id: Uuid) -> Result<ReliabilityReport, ServiceError> {
        let stats = self.db_client.get_worker_stats(worker_id).await?;
        Ok(ReliabilityReport {
            worker_id,
            reliability: compute_reliability(&stats),
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_history_means_no_score() {
        assert_eq!(compute_reliability(&WorkerStats::default()), None);
    }

    #[test]
    fn perfect_record_scores_five() {
        let stats = WorkerStats {
            completed: 12,
            check_ins: 12,
            punctual_check_ins: 12,
            review_count: 4,
            average_rating: Some(5.0),
            ..Default::default()
        };
        assert_eq!(compute_reliability(&stats).unwrap().score, 5.0);
    }

    #[test]
    fn missing_rating_and_check_ins_use_defaults() {
        // attendance 3/4: 0.4 * 4.0 + 0.3 * 4.0 + 0.3 * 5.0 = 4.3
        let stats = WorkerStats {
            completed: 3,
            no_shows: 1,
            ..Default::default()
        };
        let score = compute_reliability(&stats).unwrap();
        assert_eq!(score.score, 4.3);
        assert_eq!(score.punctuality_rate, 0.75);
        assert_eq!(score.average_rating, 5.0);
        assert_eq!(score.finished_bookings, 4);
    }

    #[test]
    fn worst_case_is_clamped_to_one() {
        let stats = WorkerStats {
            no_shows: 3,
            late_cancellations: 2,
            check_ins: 2,
            punctual_check_ins: 0,
            average_rating: Some(1.0),
            ..Default::default()
        };
        assert_eq!(compute_reliability(&stats).unwrap().score, 1.0);
    }

    #[test]
    fn score_is_rounded_to_two_decimals() {
        // attendance 2/3, punctuality 1/2, rating 4.2
        let stats = WorkerStats {
            completed: 2,
            late_cancellations: 1,
            check_ins: 2,
            punctual_check_ins: 1,
            average_rating: Some(4.2),
            ..Default::default()
        };
        let score = compute_reliability(&stats).unwrap().score;
        assert_eq!(score, (score * 100.0).round() / 100.0);
        assert!((score - 3.63).abs() < 1e-9);
    }
}
