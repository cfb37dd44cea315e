//! End-to-end tests of the HTTP surface: routing, auth middleware, error
//! mapping, and the wire shapes the client depends on.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use taskdeck_api::{AppStateInner, router};
use taskdeck_db::Database;
use taskdeck_push::PushDispatcher;

fn test_router() -> Router {
    let db = Database::open_in_memory().unwrap();
    let state = Arc::new(AppStateInner {
        db: Arc::new(db),
        jwt_secret: "test-secret".into(),
        token_days: 7,
        push: PushDispatcher::disabled(),
    });
    router(state)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post(path: &str, token: Option<&str>, body: Value) -> Request<Body> {
    with_body("POST", path, token, body)
}

fn put(path: &str, token: Option<&str>, body: Value) -> Request<Body> {
    with_body("PUT", path, token, body)
}

fn with_body(method: &str, path: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(path: &str, token: Option<&str>) -> Request<Body> {
    bodyless("GET", path, token)
}

fn delete(path: &str, token: Option<&str>) -> Request<Body> {
    bodyless("DELETE", path, token)
}

fn bodyless(method: &str, path: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

/// Registers a user and returns a valid bearer token.
async fn signup(app: &Router, email: &str) -> String {
    let (status, _) = send(
        app,
        post(
            "/auth/register",
            None,
            json!({"email": email, "password": "secret1", "name": "Tester"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        post(
            "/auth/login",
            None,
            json!({"email": email, "password": "secret1"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn register_returns_user_without_password() {
    let app = test_router();
    let (status, body) = send(
        &app,
        post(
            "/auth/register",
            None,
            json!({"email": "a@example.com", "password": "secret1", "name": "A"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "a@example.com");
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let app = test_router();
    signup(&app, "dup@example.com").await;

    let (status, body) = send(
        &app,
        post(
            "/auth/register",
            None,
            json!({"email": "dup@example.com", "password": "secret1", "name": "B"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("email"));
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = test_router();
    signup(&app, "real@example.com").await;

    let (wrong_pw, _) = send(
        &app,
        post(
            "/auth/login",
            None,
            json!({"email": "real@example.com", "password": "wrong-pw"}),
        ),
    )
    .await;
    let (no_user, _) = send(
        &app,
        post(
            "/auth/login",
            None,
            json!({"email": "ghost@example.com", "password": "whatever"}),
        ),
    )
    .await;

    assert_eq!(wrong_pw, StatusCode::UNAUTHORIZED);
    assert_eq!(no_user, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = test_router();

    let (status, _) = send(&app, get("/todos", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, get("/todos", Some("not-a-jwt"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, get("/auth/me", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registration_seeds_three_statuses() {
    let app = test_router();
    let token = signup(&app, "fresh@example.com").await;

    let (status, body) = send(&app, get("/statuses", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);

    let statuses = body.as_array().unwrap();
    assert_eq!(statuses.len(), 3);
    let orders: Vec<i64> = statuses.iter().map(|s| s["order"].as_i64().unwrap()).collect();
    assert_eq!(orders, vec![1, 2, 3]);
    let done_flags: Vec<bool> = statuses
        .iter()
        .map(|s| s["isDefault"].as_bool().unwrap())
        .collect();
    assert_eq!(done_flags, vec![false, false, true]);
}

#[tokio::test]
async fn todo_lifecycle_over_http() {
    let app = test_router();
    let token = signup(&app, "todo@example.com").await;

    // Empty text is rejected.
    let (status, _) = send(&app, post("/todos", Some(&token), json!({"text": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        post(
            "/todos",
            Some(&token),
            json!({"text": "ship it", "tags": ["a", "b", "c"], "priority": "high"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let todo = &body["todo"];
    let id = todo["id"].as_str().unwrap().to_string();
    assert_eq!(todo["tags"], json!(["a", "b", "c"]));
    assert_eq!(todo["priority"], "high");
    // Default status assignment: the lowest-ordered seeded status.
    assert!(!todo["statusId"].is_null());
    assert_eq!(todo["completed"], false);

    // Moving onto the done status forces completion even with
    // completed:false in the same payload.
    let (_, statuses) = send(&app, get("/statuses", Some(&token))).await;
    let done_id = statuses
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["isDefault"] == true)
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, body) = send(
        &app,
        put(
            &format!("/todos/{id}"),
            Some(&token),
            json!({"statusId": done_id, "completed": false}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["todo"]["completed"], true);

    let (status, _) = send(&app, delete(&format!("/todos/{id}"), Some(&token))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, get(&format!("/todos/{id}"), Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn status_in_use_maps_to_400_not_404() {
    let app = test_router();
    let token = signup(&app, "board@example.com").await;

    let (_, body) = send(&app, post("/todos", Some(&token), json!({"text": "pin"}))).await;
    let status_id = body["todo"]["statusId"].as_str().unwrap().to_string();
    let todo_id = body["todo"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, delete(&format!("/statuses/{status_id}"), Some(&token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    send(&app, delete(&format!("/todos/{todo_id}"), Some(&token))).await;
    let (status, _) = send(&app, delete(&format!("/statuses/{status_id}"), Some(&token))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn other_users_records_look_absent() {
    let app = test_router();
    let owner = signup(&app, "owner@example.com").await;
    let intruder = signup(&app, "intruder@example.com").await;

    let (_, body) = send(&app, post("/todos", Some(&owner), json!({"text": "mine"}))).await;
    let id = body["todo"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, get(&format!("/todos/{id}"), Some(&intruder))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(
        &app,
        put(&format!("/todos/{id}"), Some(&intruder), json!({"text": "stolen"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, delete(&format!("/todos/{id}"), Some(&intruder))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Still intact for the owner.
    let (status, body) = send(&app, get(&format!("/todos/{id}"), Some(&owner))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["todo"]["text"], "mine");
}

#[tokio::test]
async fn missing_body_fields_are_bad_requests() {
    let app = test_router();
    let token = signup(&app, "shape@example.com").await;

    // Missing required `text`.
    let (status, body) = send(&app, post("/todos", Some(&token), json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation failed");

    // Missing `keys` on a subscription.
    let (status, _) = send(
        &app,
        post(
            "/push/subscribe",
            Some(&token),
            json!({"endpoint": "https://push.example/ep"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Register without a password.
    let (status, _) = send(
        &app,
        post("/auth/register", None, json!({"email": "x@example.com", "name": "X"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn settings_and_push_routes() {
    let app = test_router();
    let token = signup(&app, "push@example.com").await;

    // Lazy defaults on first read.
    let (status, body) = send(&app, get("/settings/notifications", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["settings"]["pushEnabled"], true);
    assert_eq!(body["settings"]["completedEnabled"], false);

    let (status, body) = send(
        &app,
        put(
            "/settings/notifications",
            Some(&token),
            json!({"completedEnabled": true}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["settings"]["completedEnabled"], true);
    assert_eq!(body["settings"]["pushEnabled"], true);

    // No VAPID keys in the test state.
    let (status, _) = send(&app, get("/push/vapid-public-key", Some(&token))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = send(
        &app,
        post(
            "/push/subscribe",
            Some(&token),
            json!({"endpoint": "https://push.example/ep", "keys": {"p256dh": "k", "auth": "a"}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, get("/push/subscriptions", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subscriptions"].as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        post(
            "/push/unsubscribe",
            Some(&token),
            json!({"endpoint": "https://push.example/ep"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let (_, body) = send(&app, get("/push/subscriptions", Some(&token))).await;
    assert!(body["subscriptions"].as_array().unwrap().is_empty());
}
