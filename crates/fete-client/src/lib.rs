//! Thin typed data-access layer over the fete HTTP API.
//!
//! All password checks happen server-side; the only secret this layer ever
//! holds is the admin's own password input, kept in an explicit per-slug
//! [`SlugSession`] rather than ambient state. Message deletion always goes
//! through the moderation endpoint — there is no direct row delete.

use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;

use fete_types::api::{
    AddMessageRequest, CreateCelebrationRequest, CreateCelebrationResponse, DeleteMessageRequest,
    ErrorBody, UpdateMediaRequest, VerifyPasswordRequest, VerifyPasswordResponse,
};
use fete_types::models::{Celebration, MediaType, Message, PasswordRole};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message} (status {status})")]
    Api { status: u16, message: String },
    #[error("session is not admin-verified")]
    NotAdmin,
}

/// Transient, per-slug authentication state. Built fresh for each visit;
/// nothing here is persisted anywhere.
#[derive(Debug, Clone, Default)]
pub struct SlugSession {
    slug: String,
    celebration_id: Option<String>,
    view_verified: bool,
    admin_password: Option<String>,
}

impl SlugSession {
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            ..Default::default()
        }
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn celebration_id(&self) -> Option<&str> {
        self.celebration_id.as_deref()
    }

    pub fn is_view_verified(&self) -> bool {
        self.view_verified
    }

    pub fn is_admin(&self) -> bool {
        self.admin_password.is_some()
    }

    fn grant_view(&mut self, celebration_id: String) {
        self.celebration_id = Some(celebration_id);
        self.view_verified = true;
    }

    fn grant_admin(&mut self, celebration_id: String, admin_password: String) {
        self.celebration_id = Some(celebration_id);
        self.admin_password = Some(admin_password);
    }

    /// Drop all granted access, keeping the slug.
    pub fn revoke(&mut self) {
        self.celebration_id = None;
        self.view_verified = false;
        self.admin_password = None;
    }
}

pub struct FeteClient {
    http: reqwest::Client,
    base_url: String,
}

impl FeteClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // -- Celebrations --

    /// Create a celebration. The server responds with the slug only; the
    /// passwords stay with the caller.
    pub async fn create_celebration(
        &self,
        birthday_person_name: &str,
        view_password: &str,
        admin_password: &str,
    ) -> Result<String, ClientError> {
        let response = self
            .http
            .post(self.url("/celebrations"))
            .json(&CreateCelebrationRequest {
                birthday_person_name: birthday_person_name.to_string(),
                view_password: view_password.to_string(),
                admin_password: admin_password.to_string(),
            })
            .send()
            .await?;

        let body: CreateCelebrationResponse = check(response).await?.json().await?;
        debug!("Created celebration {}", body.slug);
        Ok(body.slug)
    }

    /// Public projection; `None` when the slug does not exist.
    pub async fn celebration_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Celebration>, ClientError> {
        let response = self
            .http
            .get(self.url(&format!("/celebrations/{}", slug)))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(check(response).await?.json().await?))
    }

    // -- Password verification --

    pub async fn verify_password(
        &self,
        slug: &str,
        password: &str,
        role: PasswordRole,
    ) -> Result<VerifyPasswordResponse, ClientError> {
        let response = self
            .http
            .post(self.url("/verify-password"))
            .json(&VerifyPasswordRequest {
                slug: slug.to_string(),
                password: password.to_string(),
                role: role.as_str().to_string(),
            })
            .send()
            .await?;

        // Failure statuses still carry the {valid:false, error} shape
        Ok(response.json().await?)
    }

    /// Verify the view password and mark the session on success.
    /// Returns whether access was granted.
    pub async fn unlock_view(
        &self,
        session: &mut SlugSession,
        password: &str,
    ) -> Result<bool, ClientError> {
        let result = self
            .verify_password(session.slug(), password, PasswordRole::View)
            .await?;
        if let (true, Some(id)) = (result.valid, result.celebration_id) {
            session.grant_view(id);
            return Ok(true);
        }
        Ok(false)
    }

    /// Verify the admin password and keep it in the session for subsequent
    /// moderation calls. Returns whether access was granted.
    pub async fn unlock_admin(
        &self,
        session: &mut SlugSession,
        password: &str,
    ) -> Result<bool, ClientError> {
        let result = self
            .verify_password(session.slug(), password, PasswordRole::Admin)
            .await?;
        if let (true, Some(id)) = (result.valid, result.celebration_id) {
            session.grant_admin(id, password.to_string());
            return Ok(true);
        }
        Ok(false)
    }

    // -- Messages --

    /// Messages for a slug, newest first.
    pub async fn messages_by_celebration(
        &self,
        slug: &str,
        limit: Option<u32>,
    ) -> Result<Vec<Message>, ClientError> {
        let mut url = self.url(&format!("/celebrations/{}/messages", slug));
        if let Some(limit) = limit {
            url.push_str(&format!("?limit={}", limit));
        }

        let response = self.http.get(url).send().await?;
        Ok(check(response).await?.json().await?)
    }

    pub async fn add_message(
        &self,
        slug: &str,
        sender_name: &str,
        message: &str,
        media: Option<(String, MediaType)>,
    ) -> Result<Message, ClientError> {
        let (media_url, media_type) = match media {
            Some((url, kind)) => (Some(url), Some(kind.as_str().to_string())),
            None => (None, None),
        };

        let response = self
            .http
            .post(self.url(&format!("/celebrations/{}/messages", slug)))
            .json(&AddMessageRequest {
                sender_name: sender_name.to_string(),
                message: message.to_string(),
                media_url,
                media_type,
            })
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    /// Delete a message through the moderation endpoint, which re-verifies
    /// the admin password server-side.
    pub async fn delete_message(
        &self,
        session: &SlugSession,
        message_id: &str,
    ) -> Result<(), ClientError> {
        let admin_password = session.admin_password.as_ref().ok_or(ClientError::NotAdmin)?;

        let response = self
            .http
            .post(self.url("/delete-message"))
            .json(&DeleteMessageRequest {
                message_id: message_id.to_string(),
                slug: session.slug.clone(),
                admin_password: admin_password.clone(),
            })
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    // -- Media --

    /// Replace the celebration's main media (admin-gated).
    pub async fn update_media(
        &self,
        session: &SlugSession,
        media_url: &str,
        media_type: MediaType,
    ) -> Result<(), ClientError> {
        let admin_password = session.admin_password.as_ref().ok_or(ClientError::NotAdmin)?;

        let response = self
            .http
            .put(self.url(&format!("/celebrations/{}/media", session.slug)))
            .json(&UpdateMediaRequest {
                admin_password: admin_password.clone(),
                main_media_url: media_url.to_string(),
                main_media_type: media_type.as_str().to_string(),
            })
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }
}

/// Map non-success responses to [`ClientError::Api`], reading the server's
/// JSON error body when present.
async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<ErrorBody>()
        .await
        .map(|b| b.error)
        .unwrap_or_else(|_| status.to_string());

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_starts_unverified() {
        let session = SlugSession::new("sam-abc123");
        assert_eq!(session.slug(), "sam-abc123");
        assert!(!session.is_view_verified());
        assert!(!session.is_admin());
        assert!(session.celebration_id().is_none());
    }

    #[test]
    fn view_grant_does_not_confer_admin() {
        let mut session = SlugSession::new("sam-abc123");
        session.grant_view("some-id".into());
        assert!(session.is_view_verified());
        assert!(!session.is_admin());
        assert_eq!(session.celebration_id(), Some("some-id"));
    }

    #[test]
    fn revoke_clears_everything_but_the_slug() {
        let mut session = SlugSession::new("sam-abc123");
        session.grant_admin("some-id".into(), "a1".into());
        assert!(session.is_admin());

        session.revoke();
        assert_eq!(session.slug(), "sam-abc123");
        assert!(!session.is_view_verified());
        assert!(!session.is_admin());
        assert!(session.celebration_id().is_none());
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = FeteClient::new("http://localhost:3400/");
        assert_eq!(client.url("/health"), "http://localhost:3400/health");
    }
}
