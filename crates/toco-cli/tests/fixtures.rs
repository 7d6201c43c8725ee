//! Shared fixtures for CLI integration tests.

#![allow(dead_code)]

use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Token seeded into session files and expected in Authorization headers.
pub const TOKEN: &str = "testtoken123";

/// Creates a temp TOCO_HOME directory for test isolation.
pub fn temp_toco_home() -> TempDir {
    TempDir::new().expect("create temp toco home")
}

/// Base URL the CLI should use to reach a mock server.
pub fn api_base(server: &MockServer) -> String {
    format!("{}/api/v1", server.uri())
}

/// Writes a session file with the given token into a TOCO_HOME.
pub fn seed_session(home: &TempDir, token: &str) {
    std::fs::write(
        home.path().join("session.json"),
        format!("{{\"access_token\": \"{token}\"}}"),
    )
    .expect("seed session file");
}

/// JSON profile of the test account.
pub fn user_json() -> Value {
    json!({
        "id": "u-1",
        "email": "alice@example.com",
        "name": "Alice",
        "created_at": "2026-03-01T09:00:00Z",
        "updated_at": "2026-03-01T09:00:00Z"
    })
}

/// JSON for a task owned by the test account.
pub fn task_json(id: &str, title: &str, completed: bool, created_at: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": null,
        "completed": completed,
        "user_id": "u-1",
        "created_at": created_at,
        "updated_at": created_at,
        "completed_at": if completed { json!(created_at) } else { Value::Null }
    })
}

/// Mounts `GET /api/v1/auth/me` accepting the seeded token.
pub async fn mount_me(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .mount(server)
        .await;
}

/// Mounts `GET /api/v1/todos` returning the given tasks as a bare array.
pub async fn mount_todos(server: &MockServer, tasks: Value) {
    Mock::given(method("GET"))
        .and(path("/api/v1/todos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tasks))
        .mount(server)
        .await;
}
