use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::disputedb::DisputeExt,
    dtos::{
        walletdtos::{OpenDisputeDto, RejectDisputeDto, ResolveDisputeDto},
        ApiResponse, PaginatedResponse, RequestQueryDto,
    },
    error::HttpError,
    middleware::{role_check, JWTAuthMiddeware},
    models::usermodel::UserRole,
    AppState,
};

pub fn disputes_handler() -> Router {
    let admin_routes = Router::new()
        .route("/active", get(list_active_disputes))
        .route("/:dispute_id/assign", put(assign_dispute))
        .route("/:dispute_id/resolve", put(resolve_dispute))
        .route("/:dispute_id/reject", put(reject_dispute))
        .layer(middleware::from_fn(|req, next| {
            role_check(req, next, vec![UserRole::Admin])
        }));

    Router::new()
        .route("/", post(open_dispute).get(list_my_disputes))
        .route("/:dispute_id", get(get_dispute))
        .merge(admin_routes)
}

pub async fn open_dispute(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<OpenDisputeDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let dispute = app_state.dispute_service
        .open_dispute(&auth.user, body.booking_id, body.reason, body.description)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success("Dispute opened", dispute))))
}

pub async fn list_my_disputes(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(query): Query<RequestQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let (limit, offset) = query.bounds();
    let disputes = app_state.db_client
        .get_user_disputes(auth.user.id, limit, offset)
        .await?;

    Ok(Json(PaginatedResponse::new(disputes, &query, None)))
}

pub async fn get_dispute(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(dispute_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let dispute = app_state.dispute_service
        .get_dispute(&auth.user, dispute_id)
        .await?;

    Ok(Json(ApiResponse::success("Dispute retrieved successfully", dispute)))
}

pub async fn list_active_disputes(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<RequestQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let (limit, offset) = query.bounds();
    let disputes = app_state.db_client
        .get_active_disputes(limit, offset)
        .await?;

    Ok(Json(PaginatedResponse::new(disputes, &query, None)))
}

pub async fn assign_dispute(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(dispute_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let dispute = app_state.dispute_service
        .assign(&auth.user, dispute_id)
        .await?;

    Ok(Json(ApiResponse::success("Dispute under review", dispute)))
}

pub async fn resolve_dispute(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(dispute_id): Path<Uuid>,
    Json(body): Json<ResolveDisputeDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let dispute = app_state.dispute_service
        .resolve(&auth.user, dispute_id, body.outcome, body.worker_share_bps, body.note)
        .await?;

    Ok(Json(ApiResponse::success("Dispute resolved", dispute)))
}

pub async fn reject_dispute(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(dispute_id): Path<Uuid>,
    Json(body): Json<RejectDisputeDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let dispute = app_state.dispute_service
        .reject(&auth.user, dispute_id, body.note)
        .await?;

    Ok(Json(ApiResponse::success("Dispute rejected", dispute)))
}
