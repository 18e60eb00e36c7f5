use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use validator::Validate;

use crate::{
    db::{badgedb::BadgeExt, socialdb::SocialExt},
    dtos::{
        communitydtos::{ConnectSocialDto, ShareBadgeDto, UpdateAutoShareDto},
        ApiResponse, PaginatedResponse, RequestQueryDto,
    },
    error::HttpError,
    middleware::JWTAuthMiddeware,
    models::socialmodel::{ShareEvent, SocialPlatform},
    AppState,
};

pub fn social_handler() -> Router {
    Router::new()
        .route("/connections", get(list_connections).post(connect_platform))
        .route(
            "/connections/:platform",
            put(update_auto_share).delete(disconnect_platform),
        )
        .route("/posts", get(list_posts))
        .route("/share/badge", post(share_badge))
}

pub async fn connect_platform(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<ConnectSocialDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let connection = app_state.db_client
        .upsert_social_connection(
            auth.user.id,
            body.platform,
            body.handle.trim().to_string(),
            body.access_token,
            body.auto_share,
        )
        .await?;

    tracing::info!("User {} connected {}", auth.user.id, connection.platform.to_str());

    Ok((StatusCode::CREATED, Json(ApiResponse::success("Account connected", connection))))
}

pub async fn list_connections(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let connections = app_state.db_client
        .get_social_connections(auth.user.id)
        .await?;

    Ok(Json(ApiResponse::success("Connections retrieved successfully", connections)))
}

pub async fn update_auto_share(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(platform): Path<SocialPlatform>,
    Json(body): Json<UpdateAutoShareDto>,
) -> Result<impl IntoResponse, HttpError> {
    let connection = app_state.db_client
        .set_auto_share(auth.user.id, platform, body.auto_share)
        .await?
        .ok_or_else(|| HttpError::not_found("Connection not found"))?;

    Ok(Json(ApiResponse::success("Auto-share updated", connection)))
}

pub async fn disconnect_platform(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(platform): Path<SocialPlatform>,
) -> Result<impl IntoResponse, HttpError> {
    let removed = app_state.db_client
        .delete_social_connection(auth.user.id, platform)
        .await?;

    if !removed {
        return Err(HttpError::not_found("Connection not found"));
    }

    Ok(Json(ApiResponse::success(
        "Account disconnected",
        serde_json::json!({ "platform": platform }),
    )))
}

pub async fn list_posts(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(query): Query<RequestQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let (limit, offset) = query.bounds();
    let posts = app_state.db_client
        .get_social_posts(auth.user.id, limit, offset)
        .await?;

    Ok(Json(PaginatedResponse::new(posts, &query, None)))
}

/// Manual share of a badge the caller already holds, regardless of auto-share.
pub async fn share_badge(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<ShareBadgeDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let badge = app_state.db_client
        .get_worker_badges(auth.user.id)
        .await?
        .into_iter()
        .find(|b| b.code == body.badge_code)
        .ok_or_else(|| HttpError::not_found("You have not earned this badge"))?;

    let event = ShareEvent::BadgeEarned { badge_name: badge.name };
    let posts = app_state.social_service
        .cross_post(auth.user.id, &event, body.platform, false)
        .await?;

    if posts.is_empty() {
        return Err(HttpError::bad_request("No connected accounts to share to"));
    }

    Ok(Json(ApiResponse::success("Badge shared", posts)))
}
