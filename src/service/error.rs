use thiserror::Error;
use uuid::Uuid;
use axum::http::StatusCode;

use crate::{
    error::HttpError,
    models::{
        bookingmodel::BookingStatus,
        disputemodel::DisputeStatus,
        walletmodels::LedgerError,
    },
};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Booking {0} cannot move from {1:?} to {2:?}")]
    InvalidBookingTransition(Uuid, BookingStatus, BookingStatus),

    #[error("Dispute {0} is {1:?} and cannot move to {2:?}")]
    InvalidDisputeTransition(Uuid, DisputeStatus, DisputeStatus),

    #[error("User {0} is not allowed to {1}")]
    Forbidden(Uuid, String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(#[from] LedgerError),

    #[error("Compliance check failed: {}", .0.join("; "))]
    ComplianceFailed(Vec<String>),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl ServiceError {
    pub fn not_found(what: impl Into<String>) -> Self {
        ServiceError::NotFound(what.into())
    }

    pub fn forbidden(user_id: Uuid, action: impl Into<String>) -> Self {
        ServiceError::Forbidden(user_id, action.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,

            ServiceError::InvalidBookingTransition(..)
            | ServiceError::InvalidDisputeTransition(..)
            | ServiceError::Validation(_) => StatusCode::BAD_REQUEST,

            ServiceError::Forbidden(..) => StatusCode::FORBIDDEN,

            ServiceError::Conflict(_) => StatusCode::CONFLICT,

            ServiceError::InsufficientFunds(_) => StatusCode::PAYMENT_REQUIRED,

            ServiceError::ComplianceFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,

            ServiceError::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,

            ServiceError::Database(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                StatusCode::CONFLICT
            }

            ServiceError::Database(_) | ServiceError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        let status = error.status_code();
        if status.is_server_error() {
            tracing::error!("service error: {}", error);
            return HttpError::server_error("Something went wrong. Please try again later");
        }
        HttpError::new(error.to_string(), status)
    }
}

impl From<String> for ServiceError {
    fn from(err: String) -> Self {
        ServiceError::Other(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_to_http_status() {
        let id = Uuid::new_v4();
        assert_eq!(ServiceError::not_found("Booking").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ServiceError::InvalidBookingTransition(id, BookingStatus::Completed, BookingStatus::Accepted).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ServiceError::forbidden(id, "accept").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ServiceError::ComplianceFailed(vec!["missing phone".into()]).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ServiceError::from(LedgerError::NonPositiveAmount).status_code(),
            StatusCode::PAYMENT_REQUIRED
        );
    }

    #[test]
    fn server_errors_are_not_leaked() {
        let http: HttpError = ServiceError::Other("connection string with password".into()).into();
        assert_eq!(http.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!http.message.contains("password"));
    }

    #[test]
    fn compliance_message_lists_failures() {
        let err = ServiceError::ComplianceFailed(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "Compliance check failed: a; b");
    }
}
