//! Error taxonomy for calls to the todo service.

use std::fmt;

use serde_json::Value;

/// Categories of API errors for consistent error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Request could not complete (connect, DNS, timeout, reading the body)
    Network,
    /// Non-2xx response from the server, other than 401
    Server,
    /// 401 response: token missing, invalid, or expired
    Unauthorized,
    /// Client-side validation failed before a request was sent
    Validation,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::Network => write!(f, "network"),
            ApiErrorKind::Server => write!(f, "server"),
            ApiErrorKind::Unauthorized => write!(f, "unauthorized"),
            ApiErrorKind::Validation => write!(f, "validation"),
        }
    }
}

/// Structured error from the API gateway with kind and message.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// Error category
    pub kind: ApiErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// Optional additional details (e.g., raw response body)
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// Creates an error from a failed request (never sent, timed out, or the
    /// response could not be read).
    pub fn network(err: &reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "Request timed out".to_string()
        } else if err.is_connect() {
            format!("Could not reach the server: {err}")
        } else if err.is_decode() {
            format!("Invalid response from the server: {err}")
        } else {
            format!("Request failed: {err}")
        };
        Self::new(ApiErrorKind::Network, message)
    }

    /// Creates a client-side validation error (no request was sent).
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Validation, message)
    }

    /// Creates an error from a non-2xx response.
    ///
    /// The message is taken from the response body when it carries one
    /// (`detail`, `message`, or `error` field), otherwise `fallback` is used.
    /// 401 maps to [`ApiErrorKind::Unauthorized`], everything else to
    /// [`ApiErrorKind::Server`].
    pub fn from_response(status: u16, body: &str, fallback: &str) -> Self {
        let kind = if status == 401 {
            ApiErrorKind::Unauthorized
        } else {
            ApiErrorKind::Server
        };
        let message = extract_message(body).unwrap_or_else(|| fallback.to_string());
        let details = if body.is_empty() {
            None
        } else {
            Some(body.to_string())
        };
        Self {
            kind,
            message,
            details,
        }
    }

    /// Returns whether this error is a 401 (invalid or expired token).
    pub fn is_unauthorized(&self) -> bool {
        self.kind == ApiErrorKind::Unauthorized
    }
}

/// Extracts a human-readable message from a JSON error body.
///
/// The server reports errors as `{"detail": "...", "error_code": "..."}`;
/// other deployments use `message` or `error`. All three are accepted.
fn extract_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    for key in ["detail", "message", "error"] {
        if let Some(msg) = json.get(key).and_then(Value::as_str) {
            let msg = msg.trim();
            if !msg.is_empty() {
                return Some(msg.to_string());
            }
        }
    }
    None
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for API gateway operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    /// Test: the server's `detail` field becomes the display message.
    #[test]
    fn test_from_response_extracts_detail() {
        let err = ApiError::from_response(
            400,
            r#"{"detail": "Email already registered", "error_code": "EMAIL_TAKEN"}"#,
            "Registration failed",
        );
        assert_eq!(err.kind, ApiErrorKind::Server);
        assert_eq!(err.message, "Email already registered");
        assert!(err.details.is_some());
    }

    /// Test: a `message` field is accepted when `detail` is absent.
    #[test]
    fn test_from_response_extracts_message_field() {
        let err = ApiError::from_response(500, r#"{"message": "Database down"}"#, "Request failed");
        assert_eq!(err.message, "Database down");
    }

    /// Test: non-JSON bodies fall back to the per-operation message.
    #[test]
    fn test_from_response_non_json_uses_fallback() {
        let err = ApiError::from_response(502, "<html>Bad Gateway</html>", "Failed to fetch tasks");
        assert_eq!(err.kind, ApiErrorKind::Server);
        assert_eq!(err.message, "Failed to fetch tasks");
        assert_eq!(err.details.as_deref(), Some("<html>Bad Gateway</html>"));
    }

    /// Test: structured validation bodies (array `detail`) fall back too.
    #[test]
    fn test_from_response_array_detail_uses_fallback() {
        let body = r#"{"detail": [{"loc": ["body", "title"], "msg": "field required"}]}"#;
        let err = ApiError::from_response(422, body, "Failed to create task");
        assert_eq!(err.message, "Failed to create task");
    }

    /// Test: 401 maps to the unauthorized kind regardless of body.
    #[test]
    fn test_from_response_401_is_unauthorized() {
        let err = ApiError::from_response(401, r#"{"detail": "Not authenticated"}"#, "Unauthorized");
        assert_eq!(err.kind, ApiErrorKind::Unauthorized);
        assert!(err.is_unauthorized());
        assert_eq!(err.message, "Not authenticated");
    }

    /// Test: validation errors carry their kind and no details.
    #[test]
    fn test_validation_constructor() {
        let err = ApiError::validation("Title cannot be empty");
        assert_eq!(err.kind, ApiErrorKind::Validation);
        assert_eq!(err.to_string(), "Title cannot be empty");
        assert!(err.details.is_none());
    }

    /// Test: kind display names are stable (used in logs).
    #[test]
    fn test_kind_display() {
        assert_eq!(ApiErrorKind::Network.to_string(), "network");
        assert_eq!(ApiErrorKind::Unauthorized.to_string(), "unauthorized");
    }
}
