use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::RequestQueryDto;
use crate::models::{bookingmodel::BookingStatus, jobmodel::JobStatus};

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
#[validate(schema(function = "validate_job_schedule", skip_on_field_errors = false))]
pub struct CreateJobDto {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(max = 5000, message = "Description must not exceed 5000 characters"))]
    #[serde(default)]
    pub description: String,
    #[validate(length(min = 1, max = 100, message = "Role is required"))]
    pub role: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[validate(range(min = 1, message = "Hourly rate must be positive"))]
    pub hourly_rate_cents: i64,
    #[validate(range(min = 1, max = 500, message = "Slots must be between 1 and 500"))]
    pub slots: i32,
}

fn validate_job_schedule(job: &CreateJobDto) -> Result<(), ValidationError> {
    if job.ends_at <= job.starts_at {
        return Err(ValidationError::new("ends_at must be after starts_at"));
    }
    if job.starts_at <= Utc::now() {
        return Err(ValidationError::new("starts_at must be in the future"));
    }
    Ok(())
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate)]
pub struct JobQueryDto {
    pub city: Option<String>,
    pub role: Option<String>,
    pub status: Option<JobStatus>,
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u32>,
}

impl JobQueryDto {
    pub fn pagination(&self) -> RequestQueryDto {
        RequestQueryDto { page: self.page, limit: self.limit }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate)]
pub struct BookingQueryDto {
    pub status: Option<BookingStatus>,
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u32>,
}

impl BookingQueryDto {
    pub fn pagination(&self) -> RequestQueryDto {
        RequestQueryDto { page: self.page, limit: self.limit }
    }
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct CancelBookingDto {
    pub reason_id: Uuid,
    #[validate(length(max = 500, message = "Note must not exceed 500 characters"))]
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn job(starts_in_hours: i64, length_hours: i64) -> CreateJobDto {
        let starts_at = Utc::now() + Duration::hours(starts_in_hours);
        CreateJobDto {
            title: "Bar staff".into(),
            description: String::new(),
            role: "bartender".into(),
            city: "Lagos".into(),
            address: "1 Marina".into(),
            starts_at,
            ends_at: starts_at + Duration::hours(length_hours),
            hourly_rate_cents: 2000,
            slots: 2,
        }
    }

    #[test]
    fn valid_job_passes() {
        assert!(job(24, 8).validate().is_ok());
    }

    #[test]
    fn schedule_must_be_future_and_ordered() {
        assert!(job(24, 0).validate().is_err());
        assert!(job(24, -2).validate().is_err());
        assert!(job(-1, 8).validate().is_err());
    }

    #[test]
    fn slots_and_rate_are_bounded() {
        let mut j = job(24, 8);
        j.slots = 0;
        assert!(j.validate().is_err());

        let mut j = job(24, 8);
        j.hourly_rate_cents = 0;
        assert!(j.validate().is_err());
    }
}
