//! CLI command handlers.

use anyhow::{Context, Result};
use toco_core::api::ApiClient;
use toco_core::config::Config;
use toco_core::session::{Session, TokenStore};

pub mod auth;
pub mod config;
pub mod status;
pub mod tasks;

/// Shared state for one command invocation.
pub struct Ctx {
    pub api: ApiClient,
    pub session: Session,
}

impl Ctx {
    pub fn new(base_url: &str, config: &Config) -> Result<Self> {
        let api = ApiClient::new(base_url, config.request_timeout())
            .with_context(|| format!("create API client for {base_url}"))?;

        let mut session = Session::new(TokenStore::from_home());
        session.bootstrap().context("load session")?;

        Ok(Self { api, session })
    }

    /// Validates a persisted session against the server, then errors unless
    /// the session is authenticated.
    pub async fn require_auth(&mut self) -> Result<()> {
        let had_token = self.session.token().is_some();
        self.session.restore(&self.api).await?;

        if self.session.is_authenticated() {
            return Ok(());
        }
        if had_token {
            anyhow::bail!("Session expired. Run 'toco login <email>' to sign in again.");
        }
        anyhow::bail!("Not signed in. Run 'toco login <email>' first.");
    }
}
