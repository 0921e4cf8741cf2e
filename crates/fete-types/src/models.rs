use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Public projection of a celebration. The stored row also carries the two
/// passwords; those never appear here, so this type is safe to hand to any
/// client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Celebration {
    pub id: String,
    pub slug: String,
    pub birthday_person_name: String,
    pub main_media_url: Option<String>,
    pub main_media_type: Option<MediaType>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A guest message on a celebration wall. Immutable after creation; the only
/// lifecycle transition is deletion through the moderation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub celebration_id: String,
    pub sender_name: String,
    pub message: String,
    pub media_url: Option<String>,
    pub media_type: Option<MediaType>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "image" => Some(Self::Image),
            "video" => Some(Self::Video),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

/// Which of a celebration's two passwords a caller is presenting.
/// The roles are never interchangeable, even when the stored strings happen
/// to be equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordRole {
    View,
    Admin,
}

impl PasswordRole {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "view" => Some(Self::View),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Admin => "admin",
        }
    }
}
