//! Wire types for the todo service API.
//!
//! Field names mirror the server's JSON (snake_case). Identifiers are
//! opaque strings; the client never parses or generates them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// === Domain types ===

/// A registered account as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Returns the display name, falling back to the email address.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.email)
    }
}

/// A single todo item owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set when `completed` flips to true, cleared when it flips back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

// === Request bodies ===

#[derive(Debug, Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub(crate) email: &'a str,
    pub(crate) password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub(crate) email: &'a str,
    pub(crate) password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateTaskRequest<'a> {
    pub(crate) title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<&'a str>,
}

/// Partial update for a task. Unset fields are left untouched by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// Returns a patch that only sets the completion flag.
    pub fn completion(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    /// Returns whether no field is set (nothing to send).
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }
}

// === Response bodies ===

/// Response from `POST /auth/register`: the created account plus a token.
///
/// The token is not trusted as a session; a fresh login is performed
/// instead (see `session::Session::register`).
#[derive(Debug, Deserialize)]
pub struct RegisterResponse {
    pub user: User,
    pub token: String,
}

/// Response from `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Response from `GET /health` at the server origin root.
#[derive(Debug, Deserialize)]
pub struct Health {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
}

/// The task list arrives either as a bare array or wrapped in a
/// pagination envelope, depending on the server version.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum TaskListResponse {
    Items(Vec<Task>),
    Page { items: Vec<Task> },
}

impl TaskListResponse {
    pub(crate) fn into_tasks(self) -> Vec<Task> {
        match self {
            TaskListResponse::Items(tasks) | TaskListResponse::Page { items: tasks } => tasks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test: tasks deserialize from the server's snake_case JSON.
    #[test]
    fn test_task_deserializes_server_shape() {
        let json = r#"{
            "id": "5f8a1c2e-3b4d-4e5f-8a9b-0c1d2e3f4a5b",
            "title": "Buy milk",
            "description": null,
            "completed": false,
            "user_id": "u-1",
            "created_at": "2025-08-20T10:00:00Z",
            "updated_at": "2025-08-20T10:00:00Z",
            "completed_at": null
        }"#;

        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.title, "Buy milk");
        assert!(!task.completed);
        assert!(task.description.is_none());
        assert!(task.completed_at.is_none());
    }

    /// Test: a completed task carries its completion timestamp.
    #[test]
    fn test_task_completed_at_roundtrip() {
        let json = r#"{
            "id": "t-1",
            "title": "Done thing",
            "completed": true,
            "user_id": "u-1",
            "created_at": "2025-08-20T10:00:00Z",
            "updated_at": "2025-08-21T09:30:00Z",
            "completed_at": "2025-08-21T09:30:00Z"
        }"#;

        let task: Task = serde_json::from_str(json).unwrap();
        assert!(task.completed);
        assert_eq!(task.completed_at, Some(task.updated_at));
    }

    /// Test: the list response accepts both a bare array and an envelope.
    #[test]
    fn test_task_list_response_both_shapes() {
        let task = r#"{
            "id": "t-1",
            "title": "One",
            "completed": false,
            "user_id": "u-1",
            "created_at": "2025-08-20T10:00:00Z",
            "updated_at": "2025-08-20T10:00:00Z"
        }"#;

        let bare: TaskListResponse = serde_json::from_str(&format!("[{task}]")).unwrap();
        assert_eq!(bare.into_tasks().len(), 1);

        let envelope = format!(r#"{{"items": [{task}], "total": 1, "skip": 0, "limit": 100}}"#);
        let paged: TaskListResponse = serde_json::from_str(&envelope).unwrap();
        assert_eq!(paged.into_tasks().len(), 1);
    }

    /// Test: a patch serializes only the fields that are set.
    #[test]
    fn test_task_patch_serializes_set_fields_only() {
        let patch = TaskPatch {
            title: Some("New title".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({"title": "New title"}));

        let patch = TaskPatch::completion(true);
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({"completed": true}));
    }

    /// Test: an empty patch is detected before any request is made.
    #[test]
    fn test_task_patch_is_empty() {
        assert!(TaskPatch::default().is_empty());
        assert!(!TaskPatch::completion(false).is_empty());
    }

    /// Test: register requests omit a missing display name.
    #[test]
    fn test_register_request_omits_none_name() {
        let req = RegisterRequest {
            email: "alice@example.com",
            password: "hunter2",
            name: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"email": "alice@example.com", "password": "hunter2"})
        );
    }

    /// Test: display name falls back to the email when unset or blank.
    #[test]
    fn test_user_display_name_fallback() {
        let mut user: User = serde_json::from_value(serde_json::json!({
            "id": "u-1",
            "email": "alice@example.com",
            "created_at": "2025-08-20T10:00:00Z",
            "updated_at": "2025-08-20T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(user.display_name(), "alice@example.com");

        user.name = Some("  ".to_string());
        assert_eq!(user.display_name(), "alice@example.com");

        user.name = Some("Alice".to_string());
        assert_eq!(user.display_name(), "Alice");
    }
}
