//! Client configuration.
//!
//! Settings resolve in priority order: CLI flag, config file, environment,
//! built-in default. The config file is optional JSON; a missing default file
//! is not an error, a missing explicit `--config` path is.
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_SCHEMA_VERSION: u32 = 1;
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_MAX_ARTIFACT_BYTES: u64 = 512 * 1024 * 1024;

pub const SERVER_URL_ENV: &str = "TAGX_SERVER_URL";
pub const OUTPUT_DIR_ENV: &str = "TAGX_OUTPUT_DIR";

/// On-disk config. Every setting is optional so files stay minimal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub schema_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    /// Whole-request timeout. Unset means wait for the transport to fail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_artifact_bytes: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            schema_version: CONFIG_SCHEMA_VERSION,
            server_url: None,
            output_dir: None,
            timeout_secs: None,
            max_artifact_bytes: None,
        }
    }
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub server_url: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub config_path: Option<PathBuf>,
}

/// Fully resolved settings used to build the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub output_dir: PathBuf,
    pub timeout: Option<Duration>,
    pub max_artifact_bytes: u64,
}

/// `$XDG_CONFIG_HOME/tagx/config.json` (or the platform equivalent).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tagx").join("config.json"))
}

pub fn load_config(path: &Path) -> Result<ClientConfig> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: ClientConfig =
        serde_json::from_slice(&bytes).context("parse client config JSON")?;
    validate_config(&config).with_context(|| format!("invalid config {}", path.display()))?;
    Ok(config)
}

pub fn validate_config(config: &ClientConfig) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported client config schema_version {}",
            config.schema_version
        ));
    }
    if let Some(url) = config.server_url.as_deref() {
        validate_server_url(url)?;
    }
    if config.max_artifact_bytes == Some(0) {
        return Err(anyhow!("max_artifact_bytes must be greater than zero"));
    }
    if config.timeout_secs == Some(0) {
        return Err(anyhow!("timeout_secs must be greater than zero when set"));
    }
    Ok(())
}

pub fn validate_server_url(url: &str) -> Result<()> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("server_url must be non-empty"));
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(anyhow!(
            "server_url must start with http:// or https:// (got {trimmed:?})"
        ));
    }
    Ok(())
}

/// Load the config named on the command line, or the default file if present.
pub fn load_config_for(overrides: &Overrides) -> Result<Option<ClientConfig>> {
    if let Some(path) = overrides.config_path.as_deref() {
        return load_config(path).map(Some);
    }
    match default_config_path() {
        Some(path) if path.is_file() => load_config(&path).map(Some),
        _ => Ok(None),
    }
}

/// Merge overrides, file config, and environment into final settings.
pub fn resolve_settings<F>(
    overrides: &Overrides,
    file: Option<&ClientConfig>,
    env: F,
) -> Result<Settings>
where
    F: Fn(&str) -> Option<String>,
{
    let server_url = overrides
        .server_url
        .clone()
        .or_else(|| file.and_then(|config| config.server_url.clone()))
        .or_else(|| env(SERVER_URL_ENV))
        .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
    validate_server_url(&server_url)?;

    let output_dir = overrides
        .output_dir
        .clone()
        .or_else(|| file.and_then(|config| config.output_dir.clone()))
        .or_else(|| env(OUTPUT_DIR_ENV).map(PathBuf::from))
        .unwrap_or_else(default_output_dir);

    Ok(Settings {
        server_url: server_url.trim().to_string(),
        output_dir,
        timeout: file
            .and_then(|config| config.timeout_secs)
            .map(Duration::from_secs),
        max_artifact_bytes: file
            .and_then(|config| config.max_artifact_bytes)
            .unwrap_or(DEFAULT_MAX_ARTIFACT_BYTES),
    })
}

/// Artifacts land where a browser would put them, else the working directory.
pub fn default_output_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
