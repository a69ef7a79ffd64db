use crate::{error::Result, DashboardError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// How update submissions shape their body.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UpdatePolicy {
    /// Only top-level keys that differ from the hydrated entity are sent.
    #[default]
    ChangedFields,
    /// The whole transformed tree is sent on every update.
    FullTree,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub api_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_upload_timeout_secs")]
    pub upload_timeout_secs: u64,
    #[serde(default)]
    pub update_policy: UpdatePolicy,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: i64,
}

fn default_api_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_upload_timeout_secs() -> u64 {
    120
}

fn default_page_size() -> u32 {
    10
}

fn default_cache_ttl_secs() -> i64 {
    30 * 60
}

fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return default_api_base_url();
    }
    trimmed.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            upload_timeout_secs: default_upload_timeout_secs(),
            update_policy: UpdatePolicy::default(),
            page_size: default_page_size(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl Config {
    /// Parses a config document, normalising values that older files may
    /// carry. The returned flag is set when the document should be rewritten.
    pub fn from_json(content: &str) -> Result<(Config, bool)> {
        let value: serde_json::Value = serde_json::from_str(content)
            .map_err(|e| DashboardError::Config(format!("Failed to parse config: {}", e)))?;
        let mut config: Config = serde_json::from_value(value.clone())
            .map_err(|e| DashboardError::Config(format!("Failed to parse config: {}", e)))?;

        let mut changed = false;
        let normalized = normalize_base_url(&config.api_base_url);
        if normalized != config.api_base_url {
            config.api_base_url = normalized;
            changed = true;
        }
        if config.page_size == 0 {
            config.page_size = default_page_size();
            changed = true;
        }

        // Persist keys introduced after the file was first written.
        let needs_backfill = value
            .as_object()
            .map(|obj| {
                ["update_policy", "page_size", "cache_ttl_secs"]
                    .iter()
                    .any(|key| !obj.contains_key(*key))
            })
            .unwrap_or(false);

        Ok((config, needs_backfill || changed))
    }
}

pub fn get_config_path() -> Result<PathBuf> {
    let mut path = dirs::config_dir()
        .ok_or_else(|| DashboardError::Config("Failed to get config directory".to_string()))?;

    path.push("safari-admin");
    fs::create_dir_all(&path)?;

    path.push("config.json");
    Ok(path)
}

pub fn load_config() -> Result<Config> {
    let config_path = get_config_path()?;

    if !config_path.exists() {
        let default_config = Config::default();
        save_config(&default_config)?;
        return Ok(default_config);
    }

    let content = fs::read_to_string(&config_path)?;
    let (config, rewrite) = Config::from_json(&content)?;
    if rewrite {
        tracing::debug!("Rewriting config at {}", config_path.display());
        save_config(&config)?;
    }

    Ok(config)
}

pub fn save_config(config: &Config) -> Result<()> {
    let config_path = get_config_path()?;

    let content = serde_json::to_string_pretty(config)
        .map_err(|e| DashboardError::Config(format!("Failed to serialize config: {}", e)))?;

    fs::write(&config_path, content)?;

    Ok(())
}
