// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client configuration stored as TOML in the platform config directory

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Connection and retry settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// JSON access endpoint
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Delay between receive retries
    #[serde(default = "default_retry_delay", with = "humantime_serde")]
    pub retry_delay: Duration,
    /// Consecutive receive failures before the session is given up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Locale sent with the login request
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Per-request timeout, longer than the server's long-poll cycle
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
}

fn default_server_url() -> String {
    "https://www.gokgs.com/json/access".to_string()
}

fn default_retry_delay() -> Duration {
    Duration::from_secs(3)
}

fn default_max_retries() -> u32 {
    10
}

fn default_locale() -> String {
    "en_US".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(70)
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            retry_delay: default_retry_delay(),
            max_retries: default_max_retries(),
            locale: default_locale(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// Location of `config.toml` for this user
pub fn get_config_path() -> Result<PathBuf> {
    let proj_dirs =
        ProjectDirs::from("com", "kgsgo", "kgsgo").context("Failed to determine config directory")?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

/// Load the config from the default location, writing defaults if absent
pub fn load_config() -> Result<ClientConfig> {
    let config_path = get_config_path().context("Failed to determine config path")?;
    load_config_from(&config_path)
}

/// Load the config from `config_path`, writing defaults if absent
pub fn load_config_from(config_path: &Path) -> Result<ClientConfig> {
    if !config_path.exists() {
        tracing::info!(
            "Config file not found, creating default at: {}",
            config_path.display()
        );
        let default_config = ClientConfig::default();
        save_config_to(&default_config, config_path)?;
        return Ok(default_config);
    }

    let content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

    toml::from_str::<ClientConfig>(&content)
        .with_context(|| format!("Failed to parse config file: {}", config_path.display()))
}

/// Save the config to the default location
pub fn save_config(config: &ClientConfig) -> Result<()> {
    let config_path = get_config_path().context("Failed to determine config path")?;
    save_config_to(config, &config_path)
}

/// Save the config to `config_path`, creating parent directories
pub fn save_config_to(config: &ClientConfig, config_path: &Path) -> Result<()> {
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }
    let toml_content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(config_path, toml_content)
        .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

    tracing::debug!("Saved config to: {}", config_path.display());
    Ok(())
}
