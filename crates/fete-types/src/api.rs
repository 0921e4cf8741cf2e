use serde::{Deserialize, Serialize};

// -- Password verification --

/// Body of POST /verify-password. `slug`/`password`/`type` all default to
/// empty so a missing field reaches the handler's own validation (and its
/// JSON error shape) instead of a framework rejection.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerifyPasswordRequest {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, rename = "type")]
    pub role: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyPasswordResponse {
    pub valid: bool,
    /// Present only when `valid` is true; never leaked on a failed attempt.
    #[serde(rename = "celebrationId", skip_serializing_if = "Option::is_none")]
    pub celebration_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerifyPasswordResponse {
    pub fn valid(celebration_id: String) -> Self {
        Self {
            valid: true,
            celebration_id: Some(celebration_id),
            error: None,
        }
    }

    pub fn invalid() -> Self {
        Self {
            valid: false,
            celebration_id: None,
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            celebration_id: None,
            error: Some(message.into()),
        }
    }
}

// -- Message moderation --

/// Body of POST /delete-message.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct DeleteMessageRequest {
    #[serde(default)]
    pub message_id: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub admin_password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteMessageResponse {
    pub success: bool,
}

// -- Celebrations --

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCelebrationRequest {
    #[serde(default)]
    pub birthday_person_name: String,
    #[serde(default)]
    pub view_password: String,
    #[serde(default)]
    pub admin_password: String,
}

/// Creation hands back only the shareable slug. The caller already holds
/// both passwords; the server never echoes them.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateCelebrationResponse {
    pub slug: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateMediaRequest {
    #[serde(default)]
    pub admin_password: String,
    #[serde(default)]
    pub main_media_url: String,
    #[serde(default)]
    pub main_media_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateMediaResponse {
    pub success: bool,
}

// -- Messages --

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddMessageRequest {
    #[serde(default)]
    pub sender_name: String,
    #[serde(default)]
    pub message: String,
    pub media_url: Option<String>,
    pub media_type: Option<String>,
}

/// Generic JSON error body for non-verify endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
