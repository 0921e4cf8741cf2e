use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::{info, warn};
use uuid::Uuid;

use fete_db::models::CelebrationRow;
use fete_types::api::{
    CreateCelebrationRequest, CreateCelebrationResponse, UpdateMediaRequest, UpdateMediaResponse,
};
use fete_types::models::{Celebration, MediaType};

use crate::error::ApiError;
use crate::{AppState, blocking, parse_sqlite_ts, parse_stored_media_type, slug};

const MAX_SLUG_RETRIES: u32 = 3;

/// POST /celebrations — create a celebration and hand back its slug.
/// The passwords are stored as submitted and never echoed.
pub async fn create_celebration(
    State(state): State<AppState>,
    Json(req): Json<CreateCelebrationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = req.birthday_person_name.trim().to_string();
    let view_password = req.view_password.trim().to_string();
    let admin_password = req.admin_password.trim().to_string();

    if name.is_empty() || view_password.is_empty() || admin_password.is_empty() {
        return Err(ApiError::Validation(
            "Name, view password and admin password are required".into(),
        ));
    }

    let id = Uuid::new_v4().to_string();
    let mut slug = slug::generate(&name);
    let mut retries = 0;

    loop {
        let db = state.clone();
        let args = (
            id.clone(),
            slug.clone(),
            name.clone(),
            view_password.clone(),
            admin_password.clone(),
        );
        let result = blocking(move || {
            db.db
                .insert_celebration(&args.0, &args.1, &args.2, &args.3, &args.4)
        })
        .await;

        match result {
            Ok(()) => break,
            Err(ApiError::Internal(e))
                if fete_db::is_unique_violation(&e) && retries < MAX_SLUG_RETRIES =>
            {
                warn!("Slug collision on '{}', retrying with salt", slug);
                retries += 1;
                slug = slug::generate_salted(&name);
            }
            Err(e) => return Err(e),
        }
    }

    info!("Celebration for '{}' created with slug {}", name, slug);

    Ok((
        StatusCode::CREATED,
        Json(CreateCelebrationResponse { slug }),
    ))
}

/// GET /celebrations/{slug} — public projection only; the password columns
/// are not even part of the underlying SELECT.
pub async fn get_celebration(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Celebration>, ApiError> {
    let db = state.clone();
    let row = blocking(move || db.db.celebration_public_by_slug(&slug))
        .await?
        .ok_or_else(|| ApiError::NotFound("Celebration not found".into()))?;

    Ok(Json(celebration_from_row(row)))
}

/// PUT /celebrations/{slug}/media — the only celebration mutation path.
/// Gated on the admin password, re-verified here on every call.
pub async fn update_media(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(req): Json<UpdateMediaRequest>,
) -> Result<Json<UpdateMediaResponse>, ApiError> {
    if req.admin_password.is_empty() {
        return Err(ApiError::Validation("Admin password is required".into()));
    }
    if req.main_media_url.is_empty() {
        return Err(ApiError::Validation("Media URL is required".into()));
    }
    let Some(media_type) = MediaType::parse(&req.main_media_type) else {
        return Err(ApiError::Validation(
            "Media type must be 'image' or 'video'".into(),
        ));
    };

    let db = state.clone();
    let lookup_slug = slug.clone();
    let auth = blocking(move || db.db.celebration_auth_by_slug(&lookup_slug))
        .await?
        .ok_or_else(|| ApiError::NotFound("Celebration not found".into()))?;

    if auth.admin_password != req.admin_password {
        warn!("Invalid admin password for {}", slug);
        return Err(ApiError::Unauthorized("Invalid admin password".into()));
    }

    let db = state.clone();
    let celebration_id = auth.id;
    let media_url = req.main_media_url;
    let updated = blocking(move || {
        db.db
            .update_celebration_media(&celebration_id, &media_url, media_type.as_str())
    })
    .await?;

    if !updated {
        return Err(ApiError::NotFound("Celebration not found".into()));
    }

    info!("Main media updated for {}", slug);
    Ok(Json(UpdateMediaResponse { success: true }))
}

pub(crate) fn celebration_from_row(row: CelebrationRow) -> Celebration {
    let created_at = parse_sqlite_ts(&row.created_at, &row.id);
    let updated_at = parse_sqlite_ts(&row.updated_at, &row.id);
    let main_media_type = parse_stored_media_type(row.main_media_type, &row.id);

    Celebration {
        id: row.id,
        slug: row.slug,
        birthday_person_name: row.birthday_person_name,
        main_media_url: row.main_media_url,
        main_media_type,
        created_at,
        updated_at,
    }
}
