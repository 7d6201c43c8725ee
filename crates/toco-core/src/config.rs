//! Configuration management for toco.
//!
//! Loads configuration from ${TOCO_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Built-in API base URL used when neither the environment nor the config
/// file provides one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
/// To update, edit default_config.toml directly.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Merges user config values into the default template.
///
/// This ensures new comments/sections from the template are always present,
/// while preserving user's customized values.
fn merge_with_template(user_config: &str) -> Result<String> {
    use toml_edit::DocumentMut;

    let mut doc: DocumentMut = default_config_template()
        .parse()
        .context("Failed to parse default config template")?;

    let user_doc: DocumentMut = user_config.parse().context("Failed to parse user config")?;

    merge_items(doc.as_table_mut(), user_doc.as_table());

    Ok(doc.to_string())
}

/// Recursively merges items from source table into target table.
fn merge_items(target: &mut toml_edit::Table, source: &toml_edit::Table) {
    use toml_edit::Item;

    for (key, value) in source.iter() {
        match value {
            Item::Value(v) => {
                target[key] = Item::Value(v.clone());
            }
            Item::Table(src_table) => {
                if let Some(Item::Table(target_table)) = target.get_mut(key) {
                    merge_items(target_table, src_table);
                } else {
                    target[key] = Item::Table(src_table.clone());
                }
            }
            Item::ArrayOfTables(src_arr) => {
                target[key] = Item::ArrayOfTables(src_arr.clone());
            }
            Item::None => {}
        }
    }
}

pub mod paths {
    //! Path resolution for toco configuration and data directories.
    //!
    //! TOCO_HOME resolution order:
    //! 1. TOCO_HOME environment variable (if set)
    //! 2. ~/.config/toco (default)

    use std::path::PathBuf;

    /// Returns the toco home directory.
    ///
    /// Checks TOCO_HOME env var first, falls back to ~/.config/toco
    pub fn toco_home() -> PathBuf {
        if let Ok(home) = std::env::var("TOCO_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("toco"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        toco_home().join("config.toml")
    }

    /// Returns the path to the persisted session token file.
    pub fn session_path() -> PathBuf {
        toco_home().join("session.json")
    }

    /// Returns the directory log files are written to.
    pub fn logs_dir() -> PathBuf {
        toco_home().join("logs")
    }
}

/// Server connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Optional API base URL (overrides the built-in default).
    pub base_url: Option<String>,
    /// Request timeout in seconds (0 disables).
    pub timeout_secs: u32,
}

impl ServerConfig {
    /// Returns the configured base URL if set and non-empty.
    pub fn effective_base_url(&self) -> Option<&str> {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: Config::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server connection settings.
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    const DEFAULT_TIMEOUT_SECS: u32 = 30;

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Saves only the server base URL to the config file.
    ///
    /// Creates the file if it doesn't exist.
    /// Preserves existing fields and comments using toml_edit.
    pub fn save_base_url(base_url: &str) -> Result<()> {
        Self::save_base_url_to(&paths::config_path(), base_url)
    }

    /// Saves only the server base URL to a specific config file path.
    ///
    /// Creates the file with default template if it doesn't exist.
    /// If file exists, merges user values into the latest template.
    pub fn save_base_url_to(path: &Path, base_url: &str) -> Result<()> {
        use toml_edit::{DocumentMut, value};

        let base_url = validate_base_url(base_url)?;

        // Start from template, merge user values if file exists
        let contents = if path.exists() {
            let user_config = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            merge_with_template(&user_config)?
        } else {
            default_config_template().to_string()
        };

        let mut doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        doc["server"]["base_url"] = value(base_url);

        Self::write_config(path, &doc.to_string())
    }

    /// Returns the request timeout, `None` when disabled.
    pub fn request_timeout(&self) -> Option<Duration> {
        if self.server.timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(u64::from(self.server.timeout_secs)))
        }
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

/// Resolves the effective API base URL.
///
/// Resolution order:
/// 1. `TOCO_BASE_URL` environment variable
/// 2. `[server].base_url` in config.toml
/// 3. [`DEFAULT_BASE_URL`]
///
/// The result is validated and normalized without a trailing slash.
pub fn resolve_base_url(config: &Config) -> Result<String> {
    let raw = std::env::var("TOCO_BASE_URL")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| config.server.effective_base_url().map(str::to_string))
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    validate_base_url(&raw)
}

/// Checks that a base URL parses as an absolute http(s) URL.
/// Returns the URL without a trailing slash.
pub fn validate_base_url(raw: &str) -> Result<String> {
    let raw = raw.trim();
    let parsed = url::Url::parse(raw).with_context(|| format!("Invalid base URL '{raw}'"))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        anyhow::bail!("Invalid base URL '{raw}': expected http or https");
    }
    Ok(raw.trim_end_matches('/').to_string())
}
