use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{bookingdb::BookingExt, reviewdb::ReviewExt},
    dtos::{communitydtos::CreateReviewDto, ApiResponse, PaginatedResponse, RequestQueryDto},
    error::HttpError,
    middleware::JWTAuthMiddeware,
    models::{bookingmodel::BookingStatus, notificationmodel::NotificationKind},
    service::badge_service::BadgeTrigger,
    AppState,
};

pub fn reviews_handler() -> Router {
    Router::new()
        .route("/", post(create_review))
        .route("/users/:user_id", get(get_user_reviews))
}

pub async fn create_review(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateReviewDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let booking = app_state.db_client
        .get_booking_by_id(body.booking_id)
        .await?
        .ok_or_else(|| HttpError::not_found("Booking not found"))?;

    let reviewee_id = booking
        .counterpart(auth.user.id)
        .ok_or_else(|| HttpError::forbidden("Only participants can review a booking"))?;

    if booking.status != BookingStatus::Completed {
        return Err(HttpError::bad_request("Only completed bookings can be reviewed"));
    }

    if app_state.db_client
        .get_review_for_booking(booking.id, auth.user.id)
        .await?
        .is_some()
    {
        return Err(HttpError::conflict("You have already reviewed this booking"));
    }

    let review = app_state.db_client
        .create_review(
            booking.id,
            auth.user.id,
            reviewee_id,
            body.rating,
            body.comment.unwrap_or_default(),
        )
        .await?;

    app_state.notification_service.notify_quietly(
        reviewee_id,
        NotificationKind::NewReview,
        "New review",
        format!("{} left you a {}-star review", auth.user.name, review.rating),
        Some(serde_json::json!({ "review_id": review.id, "booking_id": booking.id })),
    );

    if reviewee_id == booking.worker_id {
        app_state.badge_service
            .evaluate_in_background(booking.worker_id, BadgeTrigger::ReviewReceived);
    }

    Ok((StatusCode::CREATED, Json(ApiResponse::success("Review submitted", review))))
}

pub async fn get_user_reviews(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<RequestQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let (limit, offset) = query.bounds();
    let reviews = app_state.db_client
        .get_reviews_for_user(user_id, limit, offset)
        .await?;

    Ok(Json(PaginatedResponse::new(reviews, &query, None)))
}
