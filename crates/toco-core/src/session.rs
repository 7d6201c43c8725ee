//! Session state and persisted token storage.
//!
//! The bearer token is stored in `<home>/session.json` with restricted
//! permissions (0600). Tokens are never logged or displayed in full.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::{ApiClient, ApiError, ApiErrorKind, User};
use crate::config::paths;

/// Persisted session filename.
const SESSION_FILE: &str = "session.json";

/// On-disk shape of the persisted session.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredToken {
    access_token: String,
}

/// Storage for the persisted session token.
///
/// An explicit object rather than ambient state: the CLI constructs one
/// from its resolved home directory and hands it to [`Session`].
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Creates a store backed by the given file path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Creates a store at the default location, `<home>/session.json`.
    pub fn from_home() -> Self {
        Self::new(paths::toco_home().join(SESSION_FILE))
    }

    /// Returns the file path this store reads and writes.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Loads the persisted token, if any.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session from {}", self.path.display()))?;

        let stored: StoredToken = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse session from {}", self.path.display()))?;

        Ok(Some(stored.access_token))
    }

    /// Saves the token to disk with restricted permissions (0600).
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let stored = StoredToken {
            access_token: token.to_string(),
        };
        let contents =
            serde_json::to_string_pretty(&stored).context("Failed to serialize session")?;

        #[cfg(unix)]
        {
            use std::io::Write;
            use std::os::unix::fs::OpenOptionsExt;

            let mut file = fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)
                .with_context(|| format!("Failed to open {} for writing", self.path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&self.path, contents)
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        Ok(())
    }

    /// Removes the persisted token. Returns whether one existed.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path)
            .with_context(|| format!("Failed to remove {}", self.path.display()))?;
        Ok(true)
    }
}

/// Returns a masked version of a token for display (first 12 chars + ...).
pub fn mask_token(token: &str) -> String {
    if token.len() <= 16 {
        return "***".to_string();
    }
    // get() rather than a slice: byte 12 may not be a char boundary
    match token.get(..12) {
        Some(prefix) => format!("{prefix}..."),
        None => "***".to_string(),
    }
}

/// Authentication lifecycle of one client process: `unknown` at creation,
/// `restoring` or `anonymous` after [`Session::bootstrap`], `authenticated`
/// once the server validates a token. Logout and rejected tokens lead back
/// to `anonymous`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Startup: the persisted token has not been examined yet.
    Unknown,
    /// A persisted token was found; server validation is pending.
    Restoring { token: String },
    /// The token was validated and the profile cached.
    Authenticated { token: String, user: User },
    /// No session: no token, or the server rejected it.
    Anonymous,
}

impl SessionState {
    /// Short lowercase name for logs and status output.
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Unknown => "unknown",
            SessionState::Restoring { .. } => "restoring",
            SessionState::Authenticated { .. } => "authenticated",
            SessionState::Anonymous => "anonymous",
        }
    }
}

/// Errors from session operations.
#[derive(Debug)]
pub enum SessionError {
    /// The server rejected the login credentials.
    InvalidCredentials,
    /// Registration was rejected (e.g. duplicate email); carries the
    /// server's message.
    Registration(String),
    /// An underlying API call failed for another reason.
    Api(ApiError),
    /// The persisted token could not be read or written.
    Storage(String),
}

impl SessionError {
    fn storage(err: &anyhow::Error) -> Self {
        SessionError::Storage(format!("{err:#}"))
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::InvalidCredentials => write!(f, "Invalid email or password"),
            SessionError::Registration(msg) | SessionError::Storage(msg) => write!(f, "{msg}"),
            SessionError::Api(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<ApiError> for SessionError {
    fn from(err: ApiError) -> Self {
        SessionError::Api(err)
    }
}

/// The session state machine plus its persistence.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    store: TokenStore,
}

impl Session {
    /// Creates a session in the `Unknown` state.
    pub fn new(store: TokenStore) -> Self {
        Self {
            state: SessionState::Unknown,
            store,
        }
    }

    /// Examines the persisted token: `Unknown` becomes `Restoring` when one
    /// exists, `Anonymous` otherwise. Idempotent after the first call.
    ///
    /// # Errors
    /// Returns an error if the session file exists but is unreadable.
    pub fn bootstrap(&mut self) -> Result<()> {
        if self.state != SessionState::Unknown {
            return Ok(());
        }
        self.state = match self.store.load()? {
            Some(token) => SessionState::Restoring { token },
            None => SessionState::Anonymous,
        };
        tracing::debug!(state = self.state.name(), "session bootstrapped");
        Ok(())
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Returns the current token, whether pending validation or validated.
    pub fn token(&self) -> Option<&str> {
        match &self.state {
            SessionState::Restoring { token } | SessionState::Authenticated { token, .. } => {
                Some(token)
            }
            SessionState::Unknown | SessionState::Anonymous => None,
        }
    }

    /// Returns the validated profile, if authenticated.
    pub fn user(&self) -> Option<&User> {
        match &self.state {
            SessionState::Authenticated { user, .. } => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated { .. })
    }

    /// Validates a restored token against the server.
    ///
    /// `Restoring` becomes `Authenticated` when `/auth/me` accepts the token.
    /// A 401 means the token is stale: it is cleared from disk and the
    /// session becomes `Anonymous` (that outcome is not an error). Transport
    /// failures leave the state and the persisted token untouched.
    pub async fn restore(&mut self, api: &ApiClient) -> Result<(), SessionError> {
        let SessionState::Restoring { token } = &self.state else {
            return Ok(());
        };
        let token = token.clone();

        match api.current_user(&token).await {
            Ok(user) => {
                self.state = SessionState::Authenticated { token, user };
                Ok(())
            }
            Err(err) if err.is_unauthorized() => {
                tracing::info!("stored token rejected by server, clearing session");
                self.clear_persisted();
                self.state = SessionState::Anonymous;
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Signs in with credentials.
    ///
    /// Persists the token as soon as the server issues one, then fetches the
    /// profile. A 401 from the server maps to
    /// [`SessionError::InvalidCredentials`].
    pub async fn login(
        &mut self,
        api: &ApiClient,
        email: &str,
        password: &str,
    ) -> Result<User, SessionError> {
        let response = api.login(email, password).await.map_err(|err| {
            if err.is_unauthorized() {
                SessionError::InvalidCredentials
            } else {
                SessionError::Api(err)
            }
        })?;
        tracing::debug!(token_type = %response.token_type, "login accepted");

        let token = response.access_token;
        self.store
            .save(&token)
            .map_err(|e| SessionError::storage(&e))?;

        match api.current_user(&token).await {
            Ok(user) => {
                self.state = SessionState::Authenticated {
                    token,
                    user: user.clone(),
                };
                Ok(user)
            }
            Err(err) if err.is_unauthorized() => {
                // The token we were just issued does not work; don't keep it.
                self.clear_persisted();
                self.state = SessionState::Anonymous;
                Err(err.into())
            }
            Err(err) => {
                // Token persisted but unverified; the next bootstrap will
                // validate it.
                self.state = SessionState::Anonymous;
                Err(err.into())
            }
        }
    }

    /// Creates an account, then signs in with the same credentials.
    ///
    /// The register response's token is not used directly; the login
    /// endpoint is the sole source of session tokens. Rejections map to
    /// [`SessionError::Registration`] with the server's message.
    pub async fn register(
        &mut self,
        api: &ApiClient,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<User, SessionError> {
        api.register(email, password, name)
            .await
            .map_err(|err| match err.kind {
                ApiErrorKind::Server | ApiErrorKind::Unauthorized => {
                    SessionError::Registration(err.message)
                }
                _ => SessionError::Api(err),
            })?;

        self.login(api, email, password).await
    }

    /// Signs out.
    ///
    /// The server-side call is best-effort: its failure is logged and
    /// swallowed. Local state and the persisted token are always cleared.
    /// Returns whether a session existed.
    pub async fn logout(&mut self, api: &ApiClient) -> Result<bool, SessionError> {
        let token = self.token().map(str::to_string);

        if let Some(token) = &token {
            if let Err(err) = api.logout(token).await {
                tracing::warn!(kind = %err.kind, "server logout failed: {err}");
            }
        }

        self.state = SessionState::Anonymous;
        let had_token = self
            .store
            .clear()
            .map_err(|e| SessionError::storage(&e))?;
        Ok(token.is_some() || had_token)
    }

    /// Local-only teardown after the server reported the token invalid
    /// mid-session. No server call; clearing failures are only logged.
    pub fn force_logout(&mut self) {
        self.state = SessionState::Anonymous;
        self.clear_persisted();
    }

    fn clear_persisted(&mut self) {
        if let Err(err) = self.store.clear() {
            tracing::warn!("failed to clear persisted session: {err:#}");
        }
    }
}
