use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{
    profilemodel::WorkerProfile,
    usermodel::{User, UserRole},
};
use crate::service::reliability_service::ReliabilityScore;

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserDto {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    #[validate(
        length(min = 1, message = "Password is required"),
        length(min = 6, message = "Password must be at least 6 characters")
    )]
    pub password: String,

    #[validate(
        length(min = 1, message = "Confirm Password is required"),
        must_match(other = "password", message = "passwords do not match")
    )]
    #[serde(rename = "passwordConfirm")]
    pub password_confirm: String,

    #[validate(custom = "validate_signup_role")]
    pub role: UserRole,
}

fn validate_signup_role(role: &UserRole) -> Result<(), validator::ValidationError> {
    match role {
        UserRole::Worker | UserRole::Business => Ok(()),
        UserRole::Admin => Err(validator::ValidationError::new("invalid_role")),
    }
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct LoginUserDto {
    #[validate(length(min = 1, message = "Email is required"), email(message = "Email is invalid"))]
    pub email: String,
    #[validate(
        length(min = 1, message = "Password is required"),
        length(min = 6, message = "Password must be at least 6 characters")
    )]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FilterUserDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl FilterUserDto {
    pub fn filter_user(user: &User) -> Self {
        FilterUserDto {
            id: user.id.to_string(),
            name: user.name.to_owned(),
            email: user.email.to_owned(),
            role: user.role.to_str().to_string(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserData {
    pub user: FilterUserDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponseDto {
    pub status: String,
    pub data: UserData,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserLoginResponseDto {
    pub status: String,
    pub token: String,
}

#[derive(Serialize, Deserialize)]
pub struct Response {
    pub status: &'static str,
    pub message: String,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct NameUpdateDto {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
}

#[derive(Debug, Validate, Default, Clone, Serialize, Deserialize)]
pub struct UserPasswordUpdateDto {
    #[validate(
        length(min = 1, message = "New password is required."),
        length(min = 6, message = "new password must be at least 6 characters")
    )]
    pub new_password: String,

    #[validate(
        length(min = 1, message = "New password confirm is required."),
        must_match(other = "new_password", message = "new passwords do not match")
    )]
    pub new_password_confirm: String,

    #[validate(length(min = 1, message = "Old password is required."))]
    pub old_password: String,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct WorkerProfileDto {
    #[validate(length(min = 1, max = 120, message = "Headline must be 1-120 characters"))]
    pub headline: String,
    #[validate(length(max = 2000, message = "Bio must not exceed 2000 characters"))]
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[validate(range(min = 1, message = "Hourly rate must be positive"))]
    pub hourly_rate_cents: Option<i64>,
    #[validate(length(min = 7, max = 20, message = "Phone number is invalid"))]
    pub phone: Option<String>,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct BusinessProfileDto {
    #[validate(length(min = 1, max = 200, message = "Company name is required"))]
    pub company_name: String,
    #[validate(length(min = 1, message = "Industry is required"))]
    pub industry: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 7, max = 20, message = "Phone number is invalid"))]
    pub contact_phone: Option<String>,
}

/// Admin moderation of a worker account.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WorkerFlagsDto {
    pub is_verified: Option<bool>,
    pub is_suspended: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct WorkerProfileResponse {
    #[serde(flatten)]
    pub profile: WorkerProfile,
    pub reliability: Option<ReliabilityScore>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(role: UserRole, confirm: &str) -> RegisterUserDto {
        RegisterUserDto {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: "secret123".into(),
            password_confirm: confirm.into(),
            role,
        }
    }

    #[test]
    fn admins_cannot_self_register() {
        assert!(register(UserRole::Worker, "secret123").validate().is_ok());
        assert!(register(UserRole::Business, "secret123").validate().is_ok());
        assert!(register(UserRole::Admin, "secret123").validate().is_err());
    }

    #[test]
    fn passwords_must_match() {
        assert!(register(UserRole::Worker, "different").validate().is_err());
    }
}
