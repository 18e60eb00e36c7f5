use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::notificationdb::NotificationExt,
    dtos::{communitydtos::NotificationQueryDto, ApiResponse, PaginatedResponse},
    error::HttpError,
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn notifications_handler() -> Router {
    Router::new()
        .route("/", get(list_notifications))
        .route("/unread-count", get(unread_count))
        .route("/read-all", put(mark_all_read))
        .route("/:notification_id/read", put(mark_read))
}

pub async fn list_notifications(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(query): Query<NotificationQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let pagination = query.pagination();
    let (limit, offset) = pagination.bounds();

    let notifications = app_state.db_client
        .get_user_notifications(auth.user.id, query.unread_only, limit, offset)
        .await?;

    Ok(Json(PaginatedResponse::new(notifications, &pagination, None)))
}

pub async fn unread_count(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let count = app_state.db_client
        .get_unread_notification_count(auth.user.id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Unread notifications counted",
        serde_json::json!({ "unread": count }),
    )))
}

pub async fn mark_read(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(notification_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let notification = app_state.db_client
        .mark_notification_read(notification_id, auth.user.id)
        .await?
        .ok_or_else(|| HttpError::not_found("Notification not found"))?;

    Ok(Json(ApiResponse::success("Notification marked as read", notification)))
}

pub async fn mark_all_read(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let updated = app_state.db_client
        .mark_all_notifications_read(auth.user.id)
        .await?;

    Ok(Json(ApiResponse::success(
        "All notifications marked as read",
        serde_json::json!({ "updated": updated }),
    )))
}
