use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::{AppState, AppStateInner, routes};
use fete_db::Database;

fn test_app() -> Router {
    let db = Database::open_in_memory().unwrap();
    let state: AppState = Arc::new(AppStateInner { db });
    routes(state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

/// Create a celebration and return its slug.
async fn create(app: &Router, name: &str, view: &str, admin: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/celebrations",
        Some(json!({
            "birthday_person_name": name,
            "view_password": view,
            "admin_password": admin,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["slug"].as_str().unwrap().to_string()
}

async fn add_message(app: &Router, slug: &str, sender: &str, text: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        &format!("/celebrations/{}/messages", slug),
        Some(json!({ "sender_name": sender, "message": text })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

async fn list(app: &Router, slug: &str) -> Vec<Value> {
    let (status, body) = send(
        app,
        "GET",
        &format!("/celebrations/{}/messages", slug),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body.as_array().unwrap().clone()
}

// -- Creation & public projection --

#[tokio::test]
async fn create_returns_only_the_slug() {
    let app = test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/celebrations",
        Some(json!({
            "birthday_person_name": "Sam",
            "view_password": "v1",
            "admin_password": "a1",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let obj = body.as_object().unwrap();
    assert_eq!(obj.len(), 1, "creation must not echo anything beyond the slug");
    assert!(obj["slug"].as_str().unwrap().starts_with("sam-"));
}

#[tokio::test]
async fn create_rejects_missing_fields() {
    let app = test_app();
    for body in [
        json!({ "view_password": "v1", "admin_password": "a1" }),
        json!({ "birthday_person_name": "Sam", "admin_password": "a1" }),
        json!({ "birthday_person_name": "Sam", "view_password": "v1" }),
        json!({ "birthday_person_name": "   ", "view_password": "v1", "admin_password": "a1" }),
    ] {
        let (status, resp) = send(&app, "POST", "/celebrations", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(resp["error"].is_string());
    }
}

#[tokio::test]
async fn public_projection_never_contains_passwords() {
    let app = test_app();
    let slug = create(&app, "Sam", "v1", "a1").await;

    let (status, body) = send(&app, "GET", &format!("/celebrations/{}", slug), None).await;
    assert_eq!(status, StatusCode::OK);

    let obj = body.as_object().unwrap();
    assert_eq!(obj["slug"], slug);
    assert_eq!(obj["birthday_person_name"], "Sam");
    assert!(!obj.contains_key("view_password"));
    assert!(!obj.contains_key("admin_password"));
    assert!(obj["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert!(obj["created_at"].is_string());
}

#[tokio::test]
async fn unknown_slug_is_not_found() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/celebrations/no-such-slug", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

// -- Password verification --

#[tokio::test]
async fn verify_accepts_correct_view_password() {
    let app = test_app();
    let slug = create(&app, "Sam", "v1", "a1").await;

    let (status, body) = send(
        &app,
        "POST",
        "/verify-password",
        Some(json!({ "slug": slug, "password": "v1", "type": "view" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);
    assert!(body["celebrationId"].as_str().is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn verify_rejects_wrong_password_without_leaking_id() {
    let app = test_app();
    let slug = create(&app, "Sam", "v1", "a1").await;

    let (status, body) = send(
        &app,
        "POST",
        "/verify-password",
        Some(json!({ "slug": slug, "password": "nope", "type": "view" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);
    assert!(!body.as_object().unwrap().contains_key("celebrationId"));
}

#[tokio::test]
async fn verify_roles_are_not_interchangeable() {
    let app = test_app();
    let slug = create(&app, "Sam", "view-secret", "admin-secret").await;

    // The view password does not open the admin gate...
    let (status, body) = send(
        &app,
        "POST",
        "/verify-password",
        Some(json!({ "slug": slug, "password": "view-secret", "type": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);

    // ...and vice versa
    let (_, body) = send(
        &app,
        "POST",
        "/verify-password",
        Some(json!({ "slug": slug, "password": "admin-secret", "type": "view" })),
    )
    .await;
    assert_eq!(body["valid"], false);
}

#[tokio::test]
async fn verify_handles_coinciding_passwords() {
    // The two passwords are independent but may be equal strings; exact
    // comparison then accepts the shared string for either role.
    let app = test_app();
    let slug = create(&app, "Sam", "same", "same").await;

    for role in ["view", "admin"] {
        let (status, body) = send(
            &app,
            "POST",
            "/verify-password",
            Some(json!({ "slug": slug, "password": "same", "type": role })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], true);
    }
}

#[tokio::test]
async fn verify_unknown_slug_is_not_found() {
    let app = test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/verify-password",
        Some(json!({ "slug": "no-such-slug", "password": "v1", "type": "view" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["valid"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn verify_validates_its_input() {
    let app = test_app();

    // Missing fields
    let (status, body) = send(
        &app,
        "POST",
        "/verify-password",
        Some(json!({ "slug": "s" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["valid"], false);

    // Unknown type
    let (status, body) = send(
        &app,
        "POST",
        "/verify-password",
        Some(json!({ "slug": "s", "password": "p", "type": "owner" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["valid"], false);
    assert!(body["error"].is_string());
}

// -- Messages --

#[tokio::test]
async fn messages_list_newest_first() {
    let app = test_app();
    let slug = create(&app, "Sam", "v1", "a1").await;

    add_message(&app, &slug, "Ana", "first").await;
    add_message(&app, &slug, "Ben", "second").await;
    add_message(&app, &slug, "Cy", "third").await;

    let messages = list(&app, &slug).await;
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0]["message"], "third");
    assert_eq!(messages[2]["message"], "first");
}

#[tokio::test]
async fn message_list_honors_limit_param() {
    let app = test_app();
    let slug = create(&app, "Sam", "v1", "a1").await;
    for n in 0..4 {
        add_message(&app, &slug, "Ana", &format!("m{}", n)).await;
    }

    let (status, body) = send(
        &app,
        "GET",
        &format!("/celebrations/{}/messages?limit=2", slug),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn add_message_validates_input() {
    let app = test_app();
    let slug = create(&app, "Sam", "v1", "a1").await;
    let uri = format!("/celebrations/{}/messages", slug);

    for body in [
        json!({ "sender_name": "", "message": "hi" }),
        json!({ "sender_name": "Ana", "message": "  " }),
        json!({ "sender_name": "Ana", "message": "hi", "media_type": "gif", "media_url": "data:;base64," }),
        json!({ "sender_name": "Ana", "message": "hi", "media_type": "image" }),
        json!({ "sender_name": "Ana", "message": "hi", "media_url": "data:;base64," }),
    ] {
        let (status, resp) = send(&app, "POST", &uri, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(resp["error"].is_string());
    }
}

#[tokio::test]
async fn add_message_to_unknown_slug_is_not_found() {
    let app = test_app();
    let (status, _) = send(
        &app,
        "POST",
        "/celebrations/no-such-slug/messages",
        Some(json!({ "sender_name": "Ana", "message": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn message_media_round_trips() {
    let app = test_app();
    let slug = create(&app, "Sam", "v1", "a1").await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/celebrations/{}/messages", slug),
        Some(json!({
            "sender_name": "Ana",
            "message": "look!",
            "media_url": "data:image/png;base64,AAAA",
            "media_type": "image",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["media_type"], "image");

    let messages = list(&app, &slug).await;
    assert_eq!(messages[0]["media_url"], "data:image/png;base64,AAAA");
    assert_eq!(messages[0]["media_type"], "image");
}

// -- Message deletion --

#[tokio::test]
async fn delete_requires_every_field() {
    let app = test_app();
    for body in [
        json!({ "slug": "s", "adminPassword": "a" }),
        json!({ "messageId": "m", "adminPassword": "a" }),
        json!({ "messageId": "m", "slug": "s" }),
    ] {
        let (status, resp) = send(&app, "POST", "/delete-message", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(resp["error"].is_string());
    }
}

#[tokio::test]
async fn delete_with_wrong_password_keeps_the_row() {
    let app = test_app();
    let slug = create(&app, "Sam", "v1", "a1").await;
    let message_id = add_message(&app, &slug, "Ana", "keep me").await;

    let (status, body) = send(
        &app,
        "POST",
        "/delete-message",
        Some(json!({ "messageId": message_id, "slug": slug, "adminPassword": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    // Row must still exist
    let messages = list(&app, &slug).await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["id"], message_id.as_str());
}

#[tokio::test]
async fn delete_rejects_cross_celebration_access() {
    let app = test_app();
    let slug_a = create(&app, "Ann", "va", "aa").await;
    let slug_b = create(&app, "Bob", "vb", "ab").await;
    let message_b = add_message(&app, &slug_b, "Guest", "for bob").await;

    // Correct admin password for A, message belongs to B
    let (status, body) = send(
        &app,
        "POST",
        "/delete-message",
        Some(json!({ "messageId": message_b, "slug": slug_a, "adminPassword": "aa" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());

    let messages = list(&app, &slug_b).await;
    assert_eq!(messages.len(), 1);
}

#[tokio::test]
async fn delete_twice_reports_not_found() {
    let app = test_app();
    let slug = create(&app, "Sam", "v1", "a1").await;
    let message_id = add_message(&app, &slug, "Ana", "bye").await;

    let body = json!({ "messageId": message_id, "slug": slug, "adminPassword": "a1" });

    let (status, resp) = send(&app, "POST", "/delete-message", Some(body.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["success"], true);

    let (status, resp) = send(&app, "POST", "/delete-message", Some(body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(resp["error"].is_string());
}

#[tokio::test]
async fn delete_from_unknown_slug_is_not_found() {
    let app = test_app();
    let (status, _) = send(
        &app,
        "POST",
        "/delete-message",
        Some(json!({ "messageId": "m", "slug": "no-such-slug", "adminPassword": "a" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// -- Media update --

#[tokio::test]
async fn media_update_requires_admin_password() {
    let app = test_app();
    let slug = create(&app, "Sam", "v1", "a1").await;
    let uri = format!("/celebrations/{}/media", slug);

    let (status, _) = send(
        &app,
        "PUT",
        &uri,
        Some(json!({
            "admin_password": "wrong",
            "main_media_url": "data:image/png;base64,AAAA",
            "main_media_type": "image",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The view password is not an admin credential here either
    let (status, _) = send(
        &app,
        "PUT",
        &uri,
        Some(json!({
            "admin_password": "v1",
            "main_media_url": "data:image/png;base64,AAAA",
            "main_media_type": "image",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn media_update_rejects_unknown_media_type() {
    let app = test_app();
    let slug = create(&app, "Sam", "v1", "a1").await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/celebrations/{}/media", slug),
        Some(json!({
            "admin_password": "a1",
            "main_media_url": "data:application/pdf;base64,AAAA",
            "main_media_type": "pdf",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn media_update_is_visible_in_the_projection() {
    let app = test_app();
    let slug = create(&app, "Sam", "v1", "a1").await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/celebrations/{}/media", slug),
        Some(json!({
            "admin_password": "a1",
            "main_media_url": "data:video/mp4;base64,AAAA",
            "main_media_type": "video",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, body) = send(&app, "GET", &format!("/celebrations/{}", slug), None).await;
    assert_eq!(body["main_media_url"], "data:video/mp4;base64,AAAA");
    assert_eq!(body["main_media_type"], "video");
}

// -- End to end --

#[tokio::test]
async fn full_celebration_lifecycle() {
    let app = test_app();
    let slug = create(&app, "Sam", "v1", "a1").await;
    assert!(slug.starts_with("sam-"));

    // Guest opens the link and unlocks with the view password
    let (status, body) = send(
        &app,
        "POST",
        "/verify-password",
        Some(json!({ "slug": slug, "password": "v1", "type": "view" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);

    // Guest leaves a message
    let message_id = add_message(&app, &slug, "Sam", "Happy Bday!").await;

    let messages = list(&app, &slug).await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["sender_name"], "Sam");
    assert_eq!(messages[0]["message"], "Happy Bday!");

    // Admin moderates it away
    let (status, body) = send(
        &app,
        "POST",
        "/delete-message",
        Some(json!({ "messageId": message_id, "slug": slug, "adminPassword": "a1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    assert_eq!(list(&app, &slug).await.len(), 0);
}

#[tokio::test]
async fn health_endpoint_responds() {
    let app = test_app();
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"ok");
}
