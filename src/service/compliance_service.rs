// service/compliance_service.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    db::{
        bookingdb::{worker_has_overlap, BookingExt},
        db::DBClient,
        profiledb::{get_worker_profile_in_tx, ProfileExt},
    },
    models::profilemodel::WorkerProfile,
    service::error::ServiceError,
};

pub const MISSING_PROFILE: &str = "Worker has no profile";
pub const SUSPENDED: &str = "Worker account is suspended";
pub const UNVERIFIED: &str = "Worker identity is not verified";
pub const MISSING_PHONE: &str = "Worker has no phone number on file";
pub const OVERLAPPING_SHIFT: &str = "Worker already has an overlapping shift";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ComplianceReport {
    pub worker_id: Uuid,
    pub compliant: bool,
    pub failures: Vec<String>,
}

/// Profile-level failures, in a stable order.
pub fn profile_failures(profile: Option<&WorkerProfile>) -> Vec<String> {
    let Some(profile) = profile else {
        return vec![MISSING_PROFILE.to_string()];
    };

    let mut failures = Vec::new();
    if profile.is_suspended {
        failures.push(SUSPENDED.to_string());
    }
    if !profile.is_verified {
        failures.push(UNVERIFIED.to_string());
    }
    if profile
        .phone
        .as_deref()
        .map(|p| p.trim().is_empty())
        .unwrap_or(true)
    {
        failures.push(MISSING_PHONE.to_string());
    }
    failures
}

#[derive(Debug, Clone)]
pub struct ComplianceService {
    db_client: Arc<DBClient>,
}

impl ComplianceService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    /// Read-only check, used for previews before accepting.
    pub async fn check_worker_compliance(
        &self,
        worker_id: Uuid,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        exclude_booking: Option<Uuid>,
    ) -> Result<ComplianceReport, ServiceError> {
        let profile = self.db_client.get_worker_profile(worker_id).await?;
        let mut failures = profile_failures(profile.as_ref());

        if self
            .db_client
            .has_overlapping_booking(worker_id, starts_at, ends_at, exclude_booking)
            .await?
        {
            failures.push(OVERLAPPING_SHIFT.to_string());
        }

        Ok(ComplianceReport {
            worker_id,
            compliant: failures.is_empty(),
            failures,
        })
    }

    /// Check run while accepting a booking. The caller must already hold the
    /// worker's wallet lock.
    pub async fn enforce_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        worker_id: Uuid,
        booking_id: Uuid,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        let profile = get_worker_profile_in_tx(tx, worker_id).await?;
        let mut failures = profile_failures(profile.as_ref());

        if worker_has_overlap(tx, worker_id, starts_at, ends_at, booking_id).await? {
            failures.push(OVERLAPPING_SHIFT.to_string());
        }

        if failures.is_empty() {
            Ok(())
        } else {
            tracing::info!("Worker {} failed compliance: {:?}", worker_id, failures);
            Err(ServiceError::ComplianceFailed(failures))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> WorkerProfile {
        let now = Utc::now();
        WorkerProfile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            headline: "Barista".into(),
            bio: String::new(),
            skills: vec!["coffee".into()],
            hourly_rate_cents: Some(1800),
            phone: Some("+2348000000000".into()),
            city: "Lagos".into(),
            is_verified: true,
            is_suspended: false,
            rating: 0.0,
            rating_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn complete_profile_passes() {
        assert!(profile_failures(Some(&profile())).is_empty());
    }

    #[test]
    fn missing_profile_is_the_only_failure() {
        assert_eq!(profile_failures(None), vec![MISSING_PROFILE.to_string()]);
    }

    #[test]
    fn every_problem_is_reported() {
        let mut p = profile();
        p.is_suspended = true;
        p.is_verified = false;
        p.phone = Some("   ".into());

        assert_eq!(
            profile_failures(Some(&p)),
            vec![SUSPENDED.to_string(), UNVERIFIED.to_string(), MISSING_PHONE.to_string()]
        );
    }
}
