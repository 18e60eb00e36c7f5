use std::sync::Arc;

use axum::{
    extract::Query,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use validator::Validate;

use crate::{
    db::walletdb::WalletExt,
    dtos::{
        walletdtos::{WalletTxQueryDto, WithdrawDto},
        ApiResponse, PaginatedResponse,
    },
    error::HttpError,
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn wallet_handler() -> Router {
    Router::new()
        .route("/", get(get_wallet))
        .route("/transactions", get(get_transaction_history))
        .route("/withdraw", post(withdraw_funds))
        .route("/reconcile", get(reconcile_wallet))
}

pub async fn get_wallet(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let wallet = app_state.wallet_service.get_wallet(auth.user.id).await?;
    Ok(Json(ApiResponse::success("Wallet retrieved successfully", wallet)))
}

pub async fn get_transaction_history(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(query): Query<WalletTxQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let pagination = query.pagination();
    let (limit, offset) = pagination.bounds();

    let transactions = app_state.db_client
        .get_wallet_transactions(auth.user.id, query.kind, limit, offset)
        .await?;
    let total = app_state.db_client
        .count_wallet_transactions(auth.user.id, query.kind)
        .await?;

    Ok(Json(PaginatedResponse::new(transactions, &pagination, Some(total))))
}

pub async fn withdraw_funds(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<WithdrawDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let transaction = app_state.wallet_service
        .withdraw(auth.user.id, body.amount_cents, &body.reference)
        .await?;

    Ok(Json(ApiResponse::success("Withdrawal recorded", transaction)))
}

pub async fn reconcile_wallet(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let check = app_state.wallet_service.check_ledger(auth.user.id).await?;
    Ok(Json(ApiResponse::success("Ledger checked", check)))
}
