use std::sync::Arc;

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::{
    db::badgedb::BadgeExt,
    dtos::ApiResponse,
    error::HttpError,
    AppState,
};

pub fn badges_handler() -> Router {
    Router::new()
        .route("/", get(list_badges))
        .route("/workers/:worker_id", get(get_worker_badges))
}

pub async fn list_badges(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let badges = app_state.db_client.get_badges().await?;
    Ok(Json(ApiResponse::success("Badges retrieved successfully", badges)))
}

pub async fn get_worker_badges(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(worker_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let badges = app_state.db_client.get_worker_badges(worker_id).await?;
    Ok(Json(ApiResponse::success("Worker badges retrieved successfully", badges)))
}
