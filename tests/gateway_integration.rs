//! Gateway integration tests.
//!
//! These tests verify the complete HTTP flow end-to-end using axum's test
//! utilities. Session tests force the child-process backend so they run
//! identically on hosts without a pty device.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use codeshell::gateway::{create_router_with_state, AppState};
use codeshell::ProcessBackend;
use serde_json::{json, Value};
use tower::ServiceExt;

/// Helper to build state on the fallback backend with a known shell.
fn fallback_state() -> AppState {
    AppState::new(
        ProcessBackend::detect(true),
        Some(if cfg!(windows) {
            "powershell.exe".to_string()
        } else {
            "/bin/sh".to_string()
        }),
    )
}

/// Helper to create a JSON request.
fn json_request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");

    match body {
        Some(json) => builder.body(Body::from(json.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Helper to extract body as string.
async fn response_text(response: axum::response::Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&body).to_string()
}

/// Helper to extract JSON from response.
async fn response_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}

// ============================================================================
// Health & Info Tests
// ============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_router_with_state(fallback_state());

    let response = app
        .oneshot(json_request(Method::GET, "/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_text(response).await, "OK");
}

#[tokio::test]
async fn test_api_info_endpoint() {
    let app = create_router_with_state(fallback_state());

    let response = app
        .oneshot(json_request(Method::GET, "/api/v1", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["name"], "codeshell");
    assert_eq!(json["status"], "running");
}

// ============================================================================
// Session Management Tests
// ============================================================================

#[tokio::test]
async fn test_list_sessions_empty() {
    let app = create_router_with_state(fallback_state());

    let response = app
        .oneshot(json_request(Method::GET, "/api/v1/sessions", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert!(json["sessions"].is_array());
    assert_eq!(json["count"], 0);
}

#[tokio::test]
async fn test_create_session() {
    let app = create_router_with_state(fallback_state());

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/sessions",
            Some(json!({})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let json = response_json(response).await;
    assert_eq!(json["ok"], true);
    assert!(json["id"].as_str().unwrap().starts_with("term-"));
    assert_eq!(json["uses_native_pty"], false);
}

#[tokio::test]
async fn test_create_session_then_list() {
    let state = fallback_state();
    let app = create_router_with_state(state.clone());

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/sessions",
            Some(json!({"cols": 120, "rows": 40})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = response_json(response).await;
    let id = created["id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(json_request(Method::GET, "/api/v1/sessions", None))
        .await
        .unwrap();
    let json = response_json(response).await;

    assert_eq!(json["count"], 1);
    assert_eq!(json["sessions"][0]["id"], id);
    assert_eq!(json["sessions"][0]["cols"], 120);
    assert_eq!(json["sessions"][0]["rows"], 40);

    state.registry.shutdown();
}

#[tokio::test]
async fn test_write_session_not_found() {
    let app = create_router_with_state(fallback_state());

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/sessions/term-0-ffff/input",
            Some(json!({"data": "ls\n"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = response_json(response).await;
    assert_eq!(json["ok"], false);
    assert!(json["error"].as_str().unwrap().contains("term-0-ffff"));
}

#[tokio::test]
async fn test_resize_session_not_found() {
    let app = create_router_with_state(fallback_state());

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/sessions/term-0-ffff/resize",
            Some(json!({"cols": 100, "rows": 30})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_session_not_found() {
    let app = create_router_with_state(fallback_state());

    let response = app
        .oneshot(json_request(
            Method::DELETE,
            "/api/v1/sessions/term-0-ffff",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_kill_session_then_write_fails() {
    let state = fallback_state();
    let app = create_router_with_state(state);

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/sessions",
            Some(json!({})),
        ))
        .await
        .unwrap();
    let id = response_json(response).await["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            Method::DELETE,
            &format!("/api/v1/sessions/{}", id),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The id is unknown from the moment the kill returns.
    let response = app
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/sessions/{}/input", id),
            Some(json!({"data": "ls\n"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_resize_accepted_on_fallback() {
    let state = fallback_state();
    let app = create_router_with_state(state.clone());

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/sessions",
            Some(json!({})),
        ))
        .await
        .unwrap();
    let id = response_json(response).await["id"]
        .as_str()
        .unwrap()
        .to_string();

    // The fallback has no terminal to resize; the request still succeeds.
    let response = app
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/sessions/{}/resize", id),
            Some(json!({"cols": 132, "rows": 50})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["ok"], true);

    state.registry.shutdown();
}

// ============================================================================
// Filesystem Tests
// ============================================================================

#[tokio::test]
async fn test_fs_write_then_read_roundtrip() {
    let app = create_router_with_state(fallback_state());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("note.txt");

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/fs/write",
            Some(json!({"path": path, "content": "hello editor"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["ok"], true);

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/fs/read",
            Some(json!({"path": path})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["ok"], true);
    assert_eq!(json["content"], "hello editor");
}

#[tokio::test]
async fn test_fs_read_missing_file() {
    let app = create_router_with_state(fallback_state());
    let dir = tempfile::tempdir().unwrap();

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/fs/read",
            Some(json!({"path": dir.path().join("absent.txt")})),
        ))
        .await
        .unwrap();

    // Filesystem failures come back as a JSON envelope, not an HTTP error.
    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["ok"], false);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_fs_list_ordering() {
    let app = create_router_with_state(fallback_state());
    let dir = tempfile::tempdir().unwrap();

    std::fs::write(dir.path().join("b.txt"), "").unwrap();
    std::fs::write(dir.path().join("a.txt"), "").unwrap();
    std::fs::create_dir(dir.path().join("A")).unwrap();

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/fs/list",
            Some(json!({"path": dir.path()})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["ok"], true);

    let names: Vec<&str> = json["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();

    // Directories first, then files, lexicographic within each group.
    assert_eq!(names, vec!["A", "a.txt", "b.txt"]);
    assert_eq!(json["entries"][0]["is_directory"], true);
}

#[tokio::test]
async fn test_fs_list_not_a_directory() {
    let app = create_router_with_state(fallback_state());
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("plain.txt");
    std::fs::write(&file, "x").unwrap();

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/fs/list",
            Some(json!({"path": file})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["ok"], false);
}

#[tokio::test]
async fn test_save_file_with_explicit_path_skips_dialog() {
    let app = create_router_with_state(fallback_state());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("saved.txt");

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/dialogs/save-file",
            Some(json!({"path": path, "content": "persisted"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["canceled"], false);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "persisted");
}

// ============================================================================
// Execution Tests
// ============================================================================

#[tokio::test]
async fn test_execute_oneshot() {
    let app = create_router_with_state(fallback_state());

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/execute",
            Some(json!({"command": "echo hello"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert!(json["output"].as_str().unwrap().contains("hello"));
}

#[tokio::test]
async fn test_execute_failing_command_still_ok() {
    let app = create_router_with_state(fallback_state());

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/execute",
            Some(json!({"command": "exit 3"})),
        ))
        .await
        .unwrap();

    // Non-zero exit is reported in the output text, never as an HTTP error.
    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert!(json["output"].is_string());
}

// ============================================================================
// Error Handling Tests
// ============================================================================

#[tokio::test]
async fn test_invalid_json_body() {
    let app = create_router_with_state(fallback_state());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/sessions")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ invalid json }"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_method_not_allowed() {
    let app = create_router_with_state(fallback_state());

    let response = app
        .oneshot(json_request(Method::PUT, "/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_not_found_route() {
    let app = create_router_with_state(fallback_state());

    let response = app
        .oneshot(json_request(Method::GET, "/nonexistent", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
