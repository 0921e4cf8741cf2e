use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use fete_db::models::MessageRow;
use fete_types::api::{AddMessageRequest, DeleteMessageRequest, DeleteMessageResponse};
use fete_types::models::{MediaType, Message};

use crate::error::ApiError;
use crate::{AppState, blocking, parse_sqlite_ts, parse_stored_media_type};

#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    200
}

/// GET /celebrations/{slug}/messages — newest first.
pub async fn list_messages(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<MessageQuery>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let limit = query.limit.min(500);

    let db = state.clone();
    let celebration = blocking(move || db.db.celebration_public_by_slug(&slug))
        .await?
        .ok_or_else(|| ApiError::NotFound("Celebration not found".into()))?;

    let db = state.clone();
    let rows = blocking(move || db.db.messages_by_celebration(&celebration.id, limit)).await?;

    Ok(Json(rows.into_iter().map(message_from_row).collect()))
}

/// POST /celebrations/{slug}/messages — guest submission. Deliberately not
/// password-gated: anyone holding the shareable link may leave a message.
pub async fn add_message(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(req): Json<AddMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let sender_name = req.sender_name.trim().to_string();
    let body = req.message.trim().to_string();

    if sender_name.is_empty() || body.is_empty() {
        return Err(ApiError::Validation(
            "Sender name and message are required".into(),
        ));
    }

    let media_type = match req.media_type.as_deref() {
        Some(raw) => Some(MediaType::parse(raw).ok_or_else(|| {
            ApiError::Validation("Media type must be 'image' or 'video'".into())
        })?),
        None => None,
    };
    if media_type.is_some() != req.media_url.is_some() {
        return Err(ApiError::Validation(
            "Media URL and media type must be provided together".into(),
        ));
    }

    let db = state.clone();
    let lookup_slug = slug.clone();
    let celebration = blocking(move || db.db.celebration_public_by_slug(&lookup_slug))
        .await?
        .ok_or_else(|| ApiError::NotFound("Celebration not found".into()))?;

    let message_id = Uuid::new_v4().to_string();

    let db = state.clone();
    let insert = (
        message_id.clone(),
        celebration.id.clone(),
        sender_name.clone(),
        body.clone(),
        req.media_url.clone(),
        media_type.map(|t| t.as_str()),
    );
    blocking(move || {
        db.db.insert_message(
            &insert.0,
            &insert.1,
            &insert.2,
            &insert.3,
            insert.4.as_deref(),
            insert.5,
        )
    })
    .await?;

    info!("Message {} added to celebration {}", message_id, slug);

    Ok((
        StatusCode::CREATED,
        Json(Message {
            id: message_id,
            celebration_id: celebration.id,
            sender_name,
            message: body,
            media_url: req.media_url,
            media_type,
            created_at: chrono::Utc::now(),
        }),
    ))
}

/// POST /delete-message — admin-authorized moderation. Re-verifies the admin
/// password and checks the message actually belongs to the slug's
/// celebration before touching the row.
pub async fn delete_message(
    State(state): State<AppState>,
    Json(req): Json<DeleteMessageRequest>,
) -> Result<Json<DeleteMessageResponse>, ApiError> {
    if req.message_id.is_empty() {
        return Err(ApiError::Validation("Message ID is required".into()));
    }
    if req.slug.is_empty() {
        return Err(ApiError::Validation("Celebration slug is required".into()));
    }
    if req.admin_password.is_empty() {
        return Err(ApiError::Validation("Admin password is required".into()));
    }

    let db = state.clone();
    let slug = req.slug.clone();
    let celebration = blocking(move || db.db.celebration_auth_by_slug(&slug))
        .await?
        .ok_or_else(|| ApiError::NotFound("Celebration not found".into()))?;

    if celebration.admin_password != req.admin_password {
        warn!("Invalid admin password for {}", req.slug);
        return Err(ApiError::Unauthorized("Invalid admin password".into()));
    }

    let db = state.clone();
    let message_id = req.message_id.clone();
    let message = blocking(move || db.db.message_by_id(&message_id))
        .await?
        .ok_or_else(|| ApiError::NotFound("Message not found".into()))?;

    // A valid admin password for celebration A must not delete messages of
    // celebration B
    if message.celebration_id != celebration.id {
        warn!(
            "Message {} does not belong to celebration {}",
            req.message_id, req.slug
        );
        return Err(ApiError::Forbidden(
            "Message does not belong to this celebration".into(),
        ));
    }

    let db = state.clone();
    let message_id = req.message_id.clone();
    let deleted = blocking(move || db.db.delete_message(&message_id)).await?;

    if deleted == 0 {
        // Row vanished between lookup and delete; same outcome as the lookup
        // miss
        return Err(ApiError::NotFound("Message not found".into()));
    }

    info!(
        "Message {} deleted from celebration {}",
        req.message_id, req.slug
    );
    Ok(Json(DeleteMessageResponse { success: true }))
}

pub(crate) fn message_from_row(row: MessageRow) -> Message {
    let created_at = parse_sqlite_ts(&row.created_at, &row.id);
    let media_type = parse_stored_media_type(row.media_type, &row.id);

    Message {
        id: row.id,
        celebration_id: row.celebration_id,
        sender_name: row.sender_name,
        message: row.message,
        media_url: row.media_url,
        media_type,
        created_at,
    }
}
