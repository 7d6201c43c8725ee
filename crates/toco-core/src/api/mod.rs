//! HTTP gateway to the todo service.
//!
//! A stateless, typed façade over the REST API. The bearer token is passed
//! per call; no session state lives here. Every operation normalizes its
//! failures into [`ApiError`] (network, server, unauthorized, validation).

pub mod error;
pub mod types;

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

pub use error::{ApiError, ApiErrorKind, ApiResult};
pub use types::{Health, LoginResponse, RegisterResponse, Task, TaskPatch, User};

use types::{CreateTaskRequest, LoginRequest, RegisterRequest, TaskListResponse};

/// Standard User-Agent header for toco API requests.
pub const USER_AGENT: &str = concat!("toco/", env!("CARGO_PKG_VERSION"));

/// Client for the todo service REST API.
pub struct ApiClient {
    /// Normalized base URL without a trailing slash, e.g.
    /// `http://localhost:8000/api/v1`.
    base_url: String,
    /// Health endpoint at the server origin root, outside the API base path.
    health_url: Url,
    http: reqwest::Client,
}

impl ApiClient {
    /// Creates a client for the given base URL.
    ///
    /// The base URL must be absolute; a trailing slash is stripped. When
    /// `timeout` is `None` requests never time out client-side.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let parsed =
            Url::parse(base_url).with_context(|| format!("Invalid base URL '{base_url}'"))?;
        let health_url = parsed
            .join("/health")
            .with_context(|| format!("Cannot derive health URL from '{base_url}'"))?;

        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            health_url,
            http,
        })
    }

    /// Returns the normalized base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{path}", self.base_url))
    }

    fn authed(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        self.request(method, path)
            .header("Authorization", format!("Bearer {token}"))
    }

    /// Sends a request and checks the response status.
    ///
    /// Transport failures map to [`ApiErrorKind::Network`]; non-2xx responses
    /// map via [`ApiError::from_response`] with `fallback` as the message when
    /// the body carries none.
    async fn send(&self, request: RequestBuilder, fallback: &str) -> ApiResult<Response> {
        let response = request.send().await.map_err(|e| ApiError::network(&e))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_response(status.as_u16(), &body, fallback))
    }

    async fn json<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        response.json().await.map_err(|e| ApiError::network(&e))
    }

    // === Auth endpoints ===

    /// `POST /auth/register`: creates an account.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> ApiResult<RegisterResponse> {
        let body = RegisterRequest {
            email,
            password,
            name,
        };
        let request = self.request(Method::POST, "/auth/register").json(&body);
        let response = self.send(request, "Registration failed").await?;
        Self::json(response).await
    }

    /// `POST /auth/login`: exchanges credentials for a bearer token.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        let body = LoginRequest { email, password };
        let request = self.request(Method::POST, "/auth/login").json(&body);
        let response = self.send(request, "Login failed").await?;
        Self::json(response).await
    }

    /// `POST /auth/logout`: invalidates the token server-side.
    pub async fn logout(&self, token: &str) -> ApiResult<()> {
        let request = self.authed(Method::POST, "/auth/logout", token);
        self.send(request, "Logout failed").await?;
        Ok(())
    }

    /// `GET /auth/me`: fetches the profile behind a token. A 401 here means
    /// the token is invalid or expired.
    pub async fn current_user(&self, token: &str) -> ApiResult<User> {
        let request = self.authed(Method::GET, "/auth/me", token);
        let response = self.send(request, "Failed to fetch profile").await?;
        Self::json(response).await
    }

    // === Task endpoints ===

    /// `GET /todos`: fetches the user's full task list.
    pub async fn list_tasks(&self, token: &str) -> ApiResult<Vec<Task>> {
        let request = self.authed(Method::GET, "/todos", token);
        let response = self.send(request, "Failed to fetch tasks").await?;
        let list: TaskListResponse = Self::json(response).await?;
        Ok(list.into_tasks())
    }

    /// `GET /todos/{id}`: fetches a single task.
    pub async fn get_task(&self, token: &str, id: &str) -> ApiResult<Task> {
        let request = self.authed(Method::GET, &format!("/todos/{id}"), token);
        let response = self.send(request, "Failed to fetch task").await?;
        Self::json(response).await
    }

    /// `POST /todos`: creates a task. Title validation happens in the
    /// view-model before this is called.
    pub async fn create_task(
        &self,
        token: &str,
        title: &str,
        description: Option<&str>,
    ) -> ApiResult<Task> {
        let body = CreateTaskRequest { title, description };
        let request = self.authed(Method::POST, "/todos", token).json(&body);
        let response = self.send(request, "Failed to create task").await?;
        Self::json(response).await
    }

    /// `PATCH /todos/{id}`: partial update; only set fields are sent.
    pub async fn update_task(&self, token: &str, id: &str, patch: &TaskPatch) -> ApiResult<Task> {
        let request = self
            .authed(Method::PATCH, &format!("/todos/{id}"), token)
            .json(patch);
        let response = self.send(request, "Failed to update task").await?;
        Self::json(response).await
    }

    /// `DELETE /todos/{id}`: deletes a task (server answers 204).
    pub async fn delete_task(&self, token: &str, id: &str) -> ApiResult<()> {
        let request = self.authed(Method::DELETE, &format!("/todos/{id}"), token);
        self.send(request, "Failed to delete task").await?;
        Ok(())
    }

    // === Service endpoints ===

    /// `GET /health` at the origin root: liveness probe, no auth.
    pub async fn health(&self) -> ApiResult<Health> {
        let request = self.http.get(self.health_url.clone());
        let response = self.send(request, "Health check failed").await?;
        Self::json(response).await
    }
}
