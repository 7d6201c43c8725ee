//! Config command handlers.

use anyhow::{Context, Result};
use toco_core::config;

pub fn path() -> Result<()> {
    println!("{}", config::paths::config_path().display());
    Ok(())
}

pub fn init() -> Result<()> {
    let config_path = config::paths::config_path();
    config::Config::init(&config_path)
        .with_context(|| format!("init config at {}", config_path.display()))?;
    println!("Created config at {}", config_path.display());
    Ok(())
}

pub fn set_url(url: &str) -> Result<()> {
    let normalized = config::validate_base_url(url)?;
    config::Config::save_base_url(&normalized).context("save base URL")?;
    println!("Set server.base_url to {normalized}");
    Ok(())
}
