use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{bookingdb::BookingExt, chatdb::ChatExt, userdb::UserExt},
    dtos::{
        communitydtos::{SendMessageDto, StartConversationDto},
        ApiResponse, PaginatedResponse, RequestQueryDto,
    },
    error::HttpError,
    middleware::JWTAuthMiddeware,
    models::{chatmodel::Conversation, notificationmodel::NotificationKind},
    AppState,
};

const PREVIEW_CHARS: usize = 80;

pub fn chat_handler() -> Router {
    Router::new()
        .route("/conversations", post(start_conversation).get(list_conversations))
        .route(
            "/conversations/:conversation_id/messages",
            get(get_messages).post(send_message),
        )
        .route("/conversations/:conversation_id/read", put(mark_as_read))
        .route("/unread-count", get(unread_count))
}

async fn load_conversation(
    app_state: &AppState,
    conversation_id: Uuid,
    user_id: Uuid,
) -> Result<Conversation, HttpError> {
    let conversation = app_state.db_client
        .get_conversation_by_id(conversation_id)
        .await?
        .ok_or_else(|| HttpError::not_found("Conversation not found"))?;

    if !conversation.has_participant(user_id) {
        return Err(HttpError::forbidden("You are not part of this conversation"));
    }
    Ok(conversation)
}

fn preview(content: &str) -> String {
    if content.chars().count() <= PREVIEW_CHARS {
        return content.to_string();
    }
    let mut out: String = content.chars().take(PREVIEW_CHARS - 1).collect();
    out.push('…');
    out
}

pub async fn start_conversation(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<StartConversationDto>,
) -> Result<impl IntoResponse, HttpError> {
    if body.other_user_id == auth.user.id {
        return Err(HttpError::bad_request("Cannot start a conversation with yourself"));
    }

    app_state.db_client
        .get_user(Some(body.other_user_id), None)
        .await?
        .ok_or_else(|| HttpError::not_found("User not found"))?;

    if let Some(booking_id) = body.booking_id {
        let booking = app_state.db_client
            .get_booking_by_id(booking_id)
            .await?
            .ok_or_else(|| HttpError::not_found("Booking not found"))?;

        if !booking.is_participant(auth.user.id) || !booking.is_participant(body.other_user_id) {
            return Err(HttpError::forbidden("Both users must be part of the booking"));
        }
    }

    let conversation = app_state.db_client
        .create_or_get_conversation(auth.user.id, body.other_user_id, body.booking_id)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success("Conversation ready", conversation))))
}

pub async fn list_conversations(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(query): Query<RequestQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let (limit, offset) = query.bounds();
    let conversations = app_state.db_client
        .get_user_conversations(auth.user.id, limit, offset)
        .await?;

    Ok(Json(PaginatedResponse::new(conversations, &query, None)))
}

pub async fn get_messages(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(conversation_id): Path<Uuid>,
    Query(query): Query<RequestQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let conversation = load_conversation(&app_state, conversation_id, auth.user.id).await?;

    let (limit, offset) = query.bounds();
    let messages = app_state.db_client
        .get_conversation_messages(conversation.id, limit, offset)
        .await?;

    Ok(Json(PaginatedResponse::new(messages, &query, None)))
}

pub async fn send_message(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(conversation_id): Path<Uuid>,
    Json(body): Json<SendMessageDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let content = body.content.trim().to_string();
    if content.is_empty() {
        return Err(HttpError::bad_request("Message cannot be blank"));
    }

    let conversation = load_conversation(&app_state, conversation_id, auth.user.id).await?;

    let message = app_state.db_client
        .send_message(conversation.id, auth.user.id, content)
        .await?;

    app_state.notification_service.notify_quietly(
        conversation.other_participant(auth.user.id),
        NotificationKind::NewMessage,
        format!("New message from {}", auth.user.name),
        preview(&message.content),
        Some(serde_json::json!({
            "conversation_id": conversation.id,
            "message_id": message.id,
        })),
    );

    Ok((StatusCode::CREATED, Json(ApiResponse::success("Message sent", message))))
}

pub async fn mark_as_read(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(conversation_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let conversation = load_conversation(&app_state, conversation_id, auth.user.id).await?;

    let updated = app_state.db_client
        .mark_messages_as_read(conversation.id, auth.user.id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Messages marked as read",
        serde_json::json!({ "updated": updated }),
    )))
}

pub async fn unread_count(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let count = app_state.db_client
        .get_unread_message_count(auth.user.id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Unread messages counted",
        serde_json::json!({ "unread": count }),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn previews_are_cut_to_length() {
        assert_eq!(preview("see you at 9"), "see you at 9");

        let long = "a".repeat(200);
        let cut = preview(&long);
        assert_eq!(cut.chars().count(), PREVIEW_CHARS);
        assert!(cut.ends_with('…'));
    }
}
