use std::sync::Arc;

use axum::{
    extract::Path,
    middleware,
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{profiledb::ProfileExt, statsdb::StatsExt, userdb::UserExt},
    dtos::{
        ApiResponse, BusinessProfileDto, FilterUserDto, NameUpdateDto, Response, UserData,
        UserPasswordUpdateDto, UserResponseDto, WorkerFlagsDto, WorkerProfileDto,
        WorkerProfileResponse,
    },
    error::HttpError,
    middleware::{role_check, JWTAuthMiddeware},
    models::usermodel::UserRole,
    service::reliability_service::compute_reliability,
    utils::password,
    AppState,
};

pub fn users_handler() -> Router {
    Router::new()
        .route("/me", get(get_me))
        .route("/name", put(update_user_name))
        .route("/password", put(update_user_password))
        .route(
            "/me/worker-profile",
            get(get_own_worker_profile)
                .put(upsert_worker_profile)
                .layer(middleware::from_fn(|req, next| {
                    role_check(req, next, vec![UserRole::Worker])
                })),
        )
        .route(
            "/me/business-profile",
            get(get_own_business_profile)
                .put(upsert_business_profile)
                .layer(middleware::from_fn(|req, next| {
                    role_check(req, next, vec![UserRole::Business])
                })),
        )
        .route("/workers/:worker_id", get(get_worker_profile))
        .route("/workers/:worker_id/reliability", get(get_worker_reliability))
        .route("/businesses/:business_id", get(get_business_profile))
        .route(
            "/workers/:worker_id/flags",
            put(set_worker_flags).layer(middleware::from_fn(|req, next| {
                role_check(req, next, vec![UserRole::Admin])
            })),
        )
}

pub async fn get_me(
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    Ok(Json(UserResponseDto {
        status: "success".to_string(),
        data: UserData {
            user: FilterUserDto::filter_user(&user.user),
        },
    }))
}

pub async fn update_user_name(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<NameUpdateDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let result = app_state.db_client
        .update_user_name(user.user.id, &body.name)
        .await?;

    Ok(Json(UserResponseDto {
        status: "success".to_string(),
        data: UserData {
            user: FilterUserDto::filter_user(&result),
        },
    }))
}

pub async fn update_user_password(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<UserPasswordUpdateDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let user = &user.user;

    let password_match = password::compare(&body.old_password, &user.password)
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if !password_match {
        return Err(HttpError::bad_request("Old password is incorrect"));
    }

    let hash_password = password::hash(&body.new_password)
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    app_state.db_client
        .update_user_password(user.id, hash_password)
        .await?;

    Ok(Json(Response {
        message: "Password updated Successfully".to_string(),
        status: "success",
    }))
}

async fn worker_profile_response(
    app_state: &AppState,
    worker_id: Uuid,
) -> Result<WorkerProfileResponse, HttpError> {
    let profile = app_state.db_client
        .get_worker_profile(worker_id)
        .await?
        .ok_or_else(|| HttpError::not_found("Worker profile not found"))?;

    let stats = app_state.db_client.get_worker_stats(worker_id).await?;

    Ok(WorkerProfileResponse {
        profile,
        reliability: compute_reliability(&stats),
    })
}

pub async fn get_own_worker_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let profile = worker_profile_response(&app_state, user.user.id).await?;
    Ok(Json(ApiResponse::success("Worker profile retrieved successfully", profile)))
}

pub async fn upsert_worker_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<WorkerProfileDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let skills = body.skills
        .into_iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    let profile = app_state.db_client
        .upsert_worker_profile(
            user.user.id,
            body.headline,
            body.bio,
            skills,
            body.hourly_rate_cents,
            body.phone,
            body.city,
        )
        .await?;

    Ok(Json(ApiResponse::success("Worker profile saved", profile)))
}

pub async fn get_worker_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(worker_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let profile = worker_profile_response(&app_state, worker_id).await?;
    Ok(Json(ApiResponse::success("Worker profile retrieved successfully", profile)))
}

pub async fn get_worker_reliability(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(worker_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let report = app_state.reliability_service.report(worker_id).await?;
    Ok(Json(ApiResponse::success("Reliability score retrieved", report)))
}

pub async fn set_worker_flags(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(admin): Extension<JWTAuthMiddeware>,
    Path(worker_id): Path<Uuid>,
    Json(body): Json<WorkerFlagsDto>,
) -> Result<impl IntoResponse, HttpError> {
    if body.is_verified.is_none() && body.is_suspended.is_none() {
        return Err(HttpError::bad_request("Nothing to update"));
    }

    let profile = app_state.db_client
        .set_worker_flags(worker_id, body.is_verified, body.is_suspended)
        .await?;

    tracing::info!(
        "Admin {} updated worker {} flags (verified: {:?}, suspended: {:?})",
        admin.user.id,
        worker_id,
        body.is_verified,
        body.is_suspended
    );

    Ok(Json(ApiResponse::success("Worker flags updated", profile)))
}

pub async fn get_own_business_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let profile = app_state.db_client
        .get_business_profile(user.user.id)
        .await?
        .ok_or_else(|| HttpError::not_found("Business profile not found"))?;

    Ok(Json(ApiResponse::success("Business profile retrieved successfully", profile)))
}

pub async fn upsert_business_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<BusinessProfileDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let profile = app_state.db_client
        .upsert_business_profile(
            user.user.id,
            body.company_name,
            body.industry,
            body.address,
            body.city,
            body.contact_phone,
        )
        .await?;

    Ok(Json(ApiResponse::success("Business profile saved", profile)))
}

pub async fn get_business_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(business_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let profile = app_state.db_client
        .get_business_profile(business_id)
        .await?
        .ok_or_else(|| HttpError::not_found("Business profile not found"))?;

    Ok(Json(ApiResponse::success("Business profile retrieved successfully", profile)))
}
