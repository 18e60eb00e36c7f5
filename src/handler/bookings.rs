use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::bookingdb::BookingExt,
    dtos::{
        bookingdtos::{BookingQueryDto, CancelBookingDto},
        ApiResponse, PaginatedResponse,
    },
    error::HttpError,
    middleware::JWTAuthMiddeware,
    models::usermodel::UserRole,
    AppState,
};

pub fn bookings_handler() -> Router {
    Router::new()
        .route("/", get(list_my_bookings))
        .route("/compliance", get(preview_compliance))
        .route("/:booking_id", get(get_booking))
        .route("/:booking_id/accept", put(accept_booking))
        .route("/:booking_id/reject", put(reject_booking))
        .route("/:booking_id/check-in", put(check_in))
        .route("/:booking_id/check-out", put(check_out))
        .route("/:booking_id/cancel", put(cancel_booking))
        .route("/:booking_id/no-show", put(mark_no_show))
}

/// Worker or business view, depending on the caller's role.
pub async fn list_my_bookings(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(query): Query<BookingQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let pagination = query.pagination();
    let (limit, offset) = pagination.bounds();

    let bookings = match auth.user.role {
        UserRole::Worker => {
            app_state.db_client
                .get_worker_bookings(auth.user.id, query.status, limit, offset)
                .await?
        }
        UserRole::Business => {
            app_state.db_client
                .get_business_bookings(auth.user.id, query.status, limit, offset)
                .await?
        }
        UserRole::Admin => return Err(HttpError::bad_request("Admins have no bookings of their own")),
    };

    Ok(Json(PaginatedResponse::new(bookings, &pagination, None)))
}

pub async fn get_booking(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let booking = app_state.booking_service
        .get_booking(&auth.user, booking_id)
        .await?;

    Ok(Json(ApiResponse::success("Booking retrieved successfully", booking)))
}

pub async fn accept_booking(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let booking = app_state.booking_service
        .accept(&auth.user, booking_id)
        .await?;

    Ok(Json(ApiResponse::success("Booking accepted", booking)))
}

pub async fn reject_booking(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let booking = app_state.booking_service
        .reject(&auth.user, booking_id)
        .await?;

    Ok(Json(ApiResponse::success("Booking rejected", booking)))
}

pub async fn check_in(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let booking = app_state.booking_service
        .check_in(&auth.user, booking_id)
        .await?;

    Ok(Json(ApiResponse::success("Checked in", booking)))
}

pub async fn check_out(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let booking = app_state.booking_service
        .check_out(&auth.user, booking_id)
        .await?;

    Ok(Json(ApiResponse::success("Shift completed", booking)))
}

pub async fn cancel_booking(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(booking_id): Path<Uuid>,
    Json(body): Json<CancelBookingDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let booking = app_state.booking_service
        .cancel(&auth.user, booking_id, body.reason_id, body.note)
        .await?;

    Ok(Json(ApiResponse::success("Booking cancelled", booking)))
}

pub async fn mark_no_show(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let booking = app_state.booking_service
        .mark_no_show(&auth.user, booking_id)
        .await?;

    Ok(Json(ApiResponse::success("Booking marked as no-show", booking)))
}

#[derive(Debug, Deserialize)]
pub struct CompliancePreviewQuery {
    pub worker_id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

pub async fn preview_compliance(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<CompliancePreviewQuery>,
) -> Result<impl IntoResponse, HttpError> {
    if query.ends_at <= query.starts_at {
        return Err(HttpError::bad_request("ends_at must be after starts_at"));
    }

    let report = app_state.compliance_service
        .check_worker_compliance(query.worker_id, query.starts_at, query.ends_at, None)
        .await?;

    Ok(Json(ApiResponse::success("Compliance checked", report)))
}
