//! Integration tests for the HTTP API
//!
//! Drives the full router (CORS and tracing layers included) with
//! `tower::ServiceExt::oneshot` against an in-memory database.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use profiled::api::{router, AppState};
use profiled::config::{DatabaseLocation, ServerConfig, StatusTokenPolicy};
use profiled::ProfileService;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app_with(config: ServerConfig) -> Router {
    let store = config.database.open_store(config.max_page_size).unwrap();
    let service = ProfileService::new(Arc::new(store));
    router(AppState::new(service, &config), &config.cors).unwrap()
}

fn app() -> Router {
    app_with(ServerConfig::with_database(DatabaseLocation::Memory))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

async fn create(app: &Router, email: &str) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/profiles/",
        Some(json!({
            "name": "Test User",
            "email": email,
            "specialty": "Testing",
            "linkedin": "https://linkedin.com/in/test"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create failed: {}", body);
    body
}

#[tokio::test]
async fn test_root_and_health() {
    let app = app();

    let (status, body) = send(&app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Profile service is running");

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".to_string()));
}

#[tokio::test]
async fn test_create_returns_active_profile() {
    let app = app();
    let body = create(&app, "test@example.com").await;

    assert!(body["id"].as_i64().is_some());
    assert_eq!(body["name"], "Test User");
    assert_eq!(body["email"], "test@example.com");
    assert_eq!(body["specialty"], "Testing");
    assert_eq!(body["linkedin"], "https://linkedin.com/in/test");
    assert_eq!(body["status"], "active");
    assert!(body["start_date"].is_string());
    assert!(body["end_date"].is_null());
}

#[tokio::test]
async fn test_create_without_slash_and_without_linkedin() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/profiles",
        Some(json!({"name": "A", "email": "a@x.com", "specialty": "S"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["linkedin"].is_null());
}

#[tokio::test]
async fn test_create_missing_field_is_unprocessable() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/profiles/",
        Some(json!({"name": "A", "specialty": "S"})),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("email"));
}

#[tokio::test]
async fn test_unparseable_body_has_detail() {
    let app = app();
    let request = Request::builder()
        .method("POST")
        .uri("/profiles/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_non_numeric_id_has_detail() {
    let app = app();
    let (status, body) = send(&app, "GET", "/profiles/abc", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_create_invalid_email_is_bad_request() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/profiles/",
        Some(json!({"name": "A", "email": "not-an-email", "specialty": "S"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("not-an-email"));
}

#[tokio::test]
async fn test_duplicate_email_is_bad_request() {
    let app = app();
    create(&app, "dup@example.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/profiles/",
        Some(json!({"name": "B", "email": "dup@example.com", "specialty": "S"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("dup@example.com"));

    let (_, listed) = send(&app, "GET", "/profiles/", None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_read_profile() {
    let app = app();
    let created = create(&app, "read@example.com").await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send(&app, "GET", &format!("/profiles/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, created);
}

#[tokio::test]
async fn test_read_missing_profile_is_not_found() {
    let app = app();
    let (status, body) = send(&app, "GET", "/profiles/9999", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Profile not found");
}

#[tokio::test]
async fn test_list_paginates() {
    let app = app();
    for i in 0..3 {
        create(&app, &format!("list{}@example.com", i)).await;
    }

    let (status, body) = send(&app, "GET", "/profiles/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (_, body) = send(&app, "GET", "/profiles/?skip=0&limit=1", None).await;
    let page = body.as_array().unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0]["email"], "list0@example.com");

    let (_, body) = send(&app, "GET", "/profiles?skip=2&limit=5", None).await;
    let page = body.as_array().unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0]["email"], "list2@example.com");

    let (_, body) = send(&app, "GET", "/profiles/?skip=10", None).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_list_uses_configured_default_page_size() {
    let mut config = ServerConfig::with_database(DatabaseLocation::Memory);
    config.default_page_size = 2;
    let app = app_with(config);
    for i in 0..3 {
        create(&app, &format!("default{}@example.com", i)).await;
    }

    let (_, body) = send(&app, "GET", "/profiles/", None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_list_rejects_negative_skip() {
    let app = app();
    let (status, body) = send(&app, "GET", "/profiles/?skip=-1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_update_fields_and_status() {
    let app = app();
    let created = create(&app, "update@example.com").await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/profiles/{}", id),
        Some(json!({"name": "Updated Name", "status": "INACTIVE"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Updated Name");
    assert_eq!(body["email"], "update@example.com");
    assert_eq!(body["status"], "inactive");

    let (_, history) = send(&app, "GET", &format!("/profiles/{}/history", id), None).await;
    let statuses: Vec<_> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["status"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(statuses, vec!["active", "inactive"]);
}

#[tokio::test]
async fn test_update_same_status_adds_no_history() {
    let app = app();
    let id = create(&app, "same@example.com").await["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/profiles/{}", id),
        Some(json!({"status": "active"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, history) = send(&app, "GET", &format!("/profiles/{}/history", id), None).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_update_unknown_status_is_ignored_by_default() {
    let app = app();
    let id = create(&app, "ignore@example.com").await["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/profiles/{}", id),
        Some(json!({"specialty": "Research", "status": "retired"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["specialty"], "Research");
    assert_eq!(body["status"], "active");
}

#[tokio::test]
async fn test_update_unknown_status_rejected_under_reject_policy() {
    let mut config = ServerConfig::with_database(DatabaseLocation::Memory);
    config.status_policy = StatusTokenPolicy::Reject;
    let app = app_with(config);
    let id = create(&app, "reject@example.com").await["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/profiles/{}", id),
        Some(json!({"name": "Changed", "status": "retired"})),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("retired"));

    let (_, current) = send(&app, "GET", &format!("/profiles/{}", id), None).await;
    assert_eq!(current["name"], "Test User");
}

#[tokio::test]
async fn test_update_missing_profile_is_not_found() {
    let app = app();
    let (status, body) = send(
        &app,
        "PUT",
        "/profiles/9999",
        Some(json!({"name": "Nobody"})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Profile not found");
}

#[tokio::test]
async fn test_delete_profile() {
    let app = app();
    let id = create(&app, "delete@example.com").await["id"].as_i64().unwrap();

    let (status, body) = send(&app, "DELETE", &format!("/profiles/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Profile deleted");

    let (status, _) = send(&app, "GET", &format!("/profiles/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", &format!("/profiles/{}/history", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_missing_profile_is_not_found() {
    let app = app();
    let (status, body) = send(&app, "DELETE", "/profiles/9999", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Profile not found");
}

#[tokio::test]
async fn test_permissive_cors_allows_any_origin() {
    let app = app();
    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "http://frontend.example")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}
