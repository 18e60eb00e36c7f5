use std::sync::Arc;

use axum::{
    extract::Query,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use validator::Validate;

use crate::{
    db::{bookingdb::BookingExt, cancellationdb::CancellationExt},
    dtos::{ApiResponse, PaginatedResponse, RequestQueryDto},
    error::HttpError,
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn cancellations_handler() -> Router {
    Router::new()
        .route("/reasons", get(list_reasons))
        .route("/history", get(cancellation_history))
}

/// Reasons the caller's role may pick when cancelling.
pub async fn list_reasons(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let reasons: Vec<_> = app_state.db_client
        .get_cancellation_reasons()
        .await?
        .into_iter()
        .filter(|r| r.applies_to_role(auth.user.role))
        .collect();

    Ok(Json(ApiResponse::success("Cancellation reasons retrieved", reasons)))
}

pub async fn cancellation_history(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(query): Query<RequestQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let (limit, offset) = query.bounds();
    let bookings = app_state.db_client
        .get_cancelled_bookings_for_user(auth.user.id, limit, offset)
        .await?;

    Ok(Json(PaginatedResponse::new(bookings, &query, None)))
}
