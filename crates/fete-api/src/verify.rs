use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::{error, info, warn};

use fete_types::api::{VerifyPasswordRequest, VerifyPasswordResponse};
use fete_types::models::PasswordRole;

use crate::AppState;

/// POST /verify-password — check a submitted password against the stored
/// view or admin password for a slug. The stored passwords never leave the
/// server; `celebrationId` is returned only on a successful match.
///
/// Error bodies keep the `valid:false` key for wire compatibility with the
/// pre-existing clients of this endpoint.
pub async fn verify_password(
    State(state): State<AppState>,
    Json(req): Json<VerifyPasswordRequest>,
) -> (StatusCode, Json<VerifyPasswordResponse>) {
    if req.slug.is_empty() || req.password.is_empty() || req.role.is_empty() {
        warn!("verify-password called with missing fields");
        return (
            StatusCode::BAD_REQUEST,
            Json(VerifyPasswordResponse::error("Missing required fields")),
        );
    }

    let Some(role) = PasswordRole::parse(&req.role) else {
        warn!("verify-password called with invalid type '{}'", req.role);
        return (
            StatusCode::BAD_REQUEST,
            Json(VerifyPasswordResponse::error("Invalid password type")),
        );
    };

    info!(
        "Verifying {} password for celebration {}",
        role.as_str(),
        req.slug
    );

    let db = state.clone();
    let slug = req.slug.clone();
    let lookup = tokio::task::spawn_blocking(move || db.db.celebration_auth_by_slug(&slug)).await;

    let auth = match lookup {
        Ok(Ok(auth)) => auth,
        Ok(Err(e)) => {
            error!("Database error during password lookup: {:#}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(VerifyPasswordResponse::error("Database error")),
            );
        }
        Err(e) => {
            error!("spawn_blocking join error: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(VerifyPasswordResponse::error("Database error")),
            );
        }
    };

    let Some(auth) = auth else {
        info!("Celebration {} not found", req.slug);
        return (
            StatusCode::NOT_FOUND,
            Json(VerifyPasswordResponse::error("Celebration not found")),
        );
    };

    let stored = match role {
        PasswordRole::View => &auth.view_password,
        PasswordRole::Admin => &auth.admin_password,
    };

    if req.password == *stored {
        (StatusCode::OK, Json(VerifyPasswordResponse::valid(auth.id)))
    } else {
        info!("{} password mismatch for {}", role.as_str(), req.slug);
        (StatusCode::OK, Json(VerifyPasswordResponse::invalid()))
    }
}
