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
    db::{bookingdb::BookingExt, jobdb::JobExt},
    dtos::{
        bookingdtos::{CreateJobDto, JobQueryDto},
        ApiResponse, PaginatedResponse,
    },
    error::HttpError,
    middleware::{role_check, JWTAuthMiddeware},
    models::{jobmodel::JobStatus, usermodel::UserRole},
    AppState,
};

pub fn jobs_handler() -> Router {
    Router::new()
        .route("/", get(list_open_jobs).post(create_job))
        .route(
            "/mine",
            get(list_my_jobs).layer(middleware::from_fn(|req, next| {
                role_check(req, next, vec![UserRole::Business])
            })),
        )
        .route("/:job_id", get(get_job))
        .route("/:job_id/close", put(close_job))
        .route("/:job_id/bookings", get(get_job_bookings))
        .route(
            "/:job_id/apply",
            post(apply_to_job).layer(middleware::from_fn(|req, next| {
                role_check(req, next, vec![UserRole::Worker])
            })),
        )
}

pub async fn create_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    if auth.user.role != UserRole::Business {
        return Err(HttpError::forbidden("Only businesses can post jobs"));
    }

    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let job = app_state.db_client
        .create_job(
            auth.user.id,
            body.title,
            body.description,
            body.role.trim().to_lowercase(),
            body.city,
            body.address,
            body.starts_at,
            body.ends_at,
            body.hourly_rate_cents,
            body.slots,
        )
        .await?;

    tracing::info!("Business {} posted job {}", auth.user.id, job.id);

    Ok((StatusCode::CREATED, Json(ApiResponse::success("Job created successfully", job))))
}

pub async fn list_open_jobs(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<JobQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let pagination = query.pagination();
    let (limit, offset) = pagination.bounds();

    let jobs = app_state.db_client
        .get_open_jobs(query.city.as_deref(), query.role.as_deref(), limit, offset)
        .await?;

    Ok(Json(PaginatedResponse::new(jobs, &pagination, None)))
}

pub async fn list_my_jobs(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(query): Query<JobQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let pagination = query.pagination();
    let (limit, offset) = pagination.bounds();

    let jobs = app_state.db_client
        .get_business_jobs(auth.user.id, query.status, limit, offset)
        .await?;

    Ok(Json(PaginatedResponse::new(jobs, &pagination, None)))
}

pub async fn get_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state.db_client
        .get_job_by_id(job_id)
        .await?
        .ok_or_else(|| HttpError::not_found("Job not found"))?;

    Ok(Json(ApiResponse::success("Job retrieved successfully", job)))
}

pub async fn close_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state.db_client
        .get_job_by_id(job_id)
        .await?
        .ok_or_else(|| HttpError::not_found("Job not found"))?;

    if job.business_id != auth.user.id {
        return Err(HttpError::forbidden("Only the job owner can close this job"));
    }
    if !matches!(job.status, JobStatus::Open | JobStatus::Filled) {
        return Err(HttpError::bad_request("Job is already closed"));
    }

    let job = app_state.db_client
        .update_job_status(job.id, JobStatus::Closed)
        .await?;

    Ok(Json(ApiResponse::success("Job closed", job)))
}

pub async fn get_job_bookings(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state.db_client
        .get_job_by_id(job_id)
        .await?
        .ok_or_else(|| HttpError::not_found("Job not found"))?;

    if job.business_id != auth.user.id && !auth.user.is_admin() {
        return Err(HttpError::forbidden("Only the job owner can view its bookings"));
    }

    let bookings = app_state.db_client.get_job_bookings(job.id).await?;

    Ok(Json(ApiResponse::success("Bookings retrieved successfully", bookings)))
}

pub async fn apply_to_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let booking = app_state.booking_service
        .apply(&auth.user, job_id)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success("Application submitted", booking))))
}
