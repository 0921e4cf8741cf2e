/// Database row types — these map directly to SQLite rows.
/// Distinct from the fete-types API models so the password columns stay
/// confined to this layer.

/// Full lookup row for password checks. Read by the verification and
/// moderation handlers only; never serialized into a response.
pub struct CelebrationAuthRow {
    pub id: String,
    pub view_password: String,
    pub admin_password: String,
}

/// Client-readable projection. The SELECT behind it never touches the
/// password columns.
pub struct CelebrationRow {
    pub id: String,
    pub slug: String,
    pub birthday_person_name: String,
    pub main_media_url: Option<String>,
    pub main_media_type: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

pub struct MessageRow {
    pub id: String,
    pub celebration_id: String,
    pub sender_name: String,
    pub message: String,
    pub media_url: Option<String>,
    pub media_type: Option<String>,
    pub created_at: String,
}
