pub mod celebrations;
pub mod error;
pub mod messages;
pub mod slug;
pub mod verify;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use chrono::{DateTime, Utc};
use tracing::warn;

use fete_db::Database;
use fete_types::models::MediaType;

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
}

/// All routes of the celebration service. CORS/trace layers and body limits
/// are applied by the binary.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/verify-password", post(verify::verify_password))
        .route("/delete-message", post(messages::delete_message))
        .route("/celebrations", post(celebrations::create_celebration))
        .route("/celebrations/{slug}", get(celebrations::get_celebration))
        .route(
            "/celebrations/{slug}/messages",
            get(messages::list_messages).post(messages::add_message),
        )
        .route("/celebrations/{slug}/media", put(celebrations::update_media))
        .with_state(state)
}

/// GET /health — liveness check (no auth).
pub async fn health() -> &'static str {
    "ok"
}

/// Run blocking SQLite work off the async runtime.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("spawn_blocking join error: {}", e)))?
        .map_err(ApiError::Internal)
}

/// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
/// Parse as naive UTC, falling back through RFC 3339 first.
pub(crate) fn parse_sqlite_ts(raw: &str, row_id: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}' on row '{}': {}", raw, row_id, e);
            DateTime::default()
        })
}

pub(crate) fn parse_stored_media_type(raw: Option<String>, row_id: &str) -> Option<MediaType> {
    raw.and_then(|s| {
        let parsed = MediaType::parse(&s);
        if parsed.is_none() {
            warn!("Corrupt media type '{}' on row '{}'", s, row_id);
        }
        parsed
    })
}
