use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::money;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "job_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Open,
    Filled,
    Closed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Job {
    pub id: Uuid,
    pub business_id: Uuid,
    pub title: String,
    pub description: String,
    pub role: String,
    pub city: String,
    pub address: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub hourly_rate_cents: i64,
    pub slots: i32,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn scheduled_minutes(&self) -> i64 {
        (self.ends_at - self.starts_at).num_minutes().max(0)
    }

    /// Gross pay for one worker over the scheduled shift.
    pub fn booking_amount_cents(&self) -> i64 {
        money::amount_for_minutes(self.hourly_rate_cents, self.scheduled_minutes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn job(minutes: i64, rate: i64) -> Job {
        let starts_at = Utc::now();
        Job {
            id: Uuid::new_v4(),
            business_id: Uuid::new_v4(),
            title: "Barista".into(),
            description: "Morning shift".into(),
            role: "barista".into(),
            city: "Lagos".into(),
            address: "1 Market St".into(),
            starts_at,
            ends_at: starts_at + Duration::minutes(minutes),
            hourly_rate_cents: rate,
            slots: 1,
            status: JobStatus::Open,
            created_at: starts_at,
            updated_at: starts_at,
        }
    }

    #[test]
    fn booking_amount_uses_scheduled_length() {
        assert_eq!(job(480, 2000).booking_amount_cents(), 16000);
        assert_eq!(job(150, 1800).booking_amount_cents(), 4500);
    }
}
