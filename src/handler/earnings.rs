use std::sync::Arc;

use axum::{
    extract::Query,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};

use crate::{
    dtos::{walletdtos::EarningsQueryDto, ApiResponse},
    error::HttpError,
    middleware::JWTAuthMiddeware,
    models::usermodel::UserRole,
    AppState,
};

pub fn earnings_handler() -> Router {
    Router::new().route("/", get(get_earnings))
}

/// Earnings for workers, spend for businesses.
pub async fn get_earnings(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(query): Query<EarningsQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    match auth.user.role {
        UserRole::Worker => {
            let summary = app_state.earnings_service
                .worker_summary(auth.user.id, query.period, query.since)
                .await?;
            Ok(Json(ApiResponse::success("Earnings retrieved", serde_json::to_value(summary)
                .map_err(|e| HttpError::server_error(e.to_string()))?)))
        }
        UserRole::Business => {
            let summary = app_state.earnings_service
                .business_summary(auth.user.id, query.period, query.since)
                .await?;
            Ok(Json(ApiResponse::success("Spend retrieved", serde_json::to_value(summary)
                .map_err(|e| HttpError::server_error(e.to_string()))?)))
        }
        UserRole::Admin => Err(HttpError::bad_request("Earnings are only tracked for workers and businesses")),
    }
}
