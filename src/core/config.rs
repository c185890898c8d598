use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::auth::DEFAULT_TOKEN_URL;
use crate::core::billing::api::DEFAULT_COST_URL;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThresholdSettings {
    #[serde(default = "default_warning")]
    pub warning: Decimal,
    #[serde(default = "default_critical")]
    pub critical: Decimal,
}

fn default_warning() -> Decimal {
    Decimal::new(1000, 2)
}
fn default_critical() -> Decimal {
    Decimal::new(5000, 2)
}

impl Default for ThresholdSettings {
    fn default() -> Self {
        Self {
            warning: default_warning(),
            critical: default_critical(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthSettings {
    /// Overrides ~/.stackit/sa-key.json
    pub sa_key_json: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_cost_url")]
    pub cost_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
}

fn default_cost_url() -> String {
    DEFAULT_COST_URL.to_string()
}
fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_string()
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            cost_url: default_cost_url(),
            token_url: default_token_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub skip_discount: bool,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            skip_discount: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub thresholds: ThresholdSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub settings: Settings,
}

impl AppConfig {
    /// Get the config file path, respecting XDG_CONFIG_HOME
    pub fn config_path() -> PathBuf {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("~"))
                    .join(".config")
            });
        config_dir.join("stackit-cost-check").join("config.toml")
    }

    /// Load config from `path`, or from the default path when `None`.
    /// A missing default file yields defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::config_path(), false),
        };
        if !explicit && !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::ReadError {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::ParseError { path, source })
    }

    /// Validate the config
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.thresholds.warning.is_sign_negative() && !self.thresholds.warning.is_zero() {
            issues.push(format!(
                "Invalid warning threshold: {} (must be >= 0)",
                self.thresholds.warning
            ));
        }
        if self.thresholds.critical.is_sign_negative() && !self.thresholds.critical.is_zero() {
            issues.push(format!(
                "Invalid critical threshold: {} (must be >= 0)",
                self.thresholds.critical
            ));
        }
        if self.settings.timeout_secs == 0 {
            issues.push("Invalid timeout_secs: 0 (must be > 0)".to_string());
        }
        for (name, url) in [("cost_url", &self.api.cost_url), ("token_url", &self.api.token_url)] {
            if let Err(e) = validate_endpoint(url, name) {
                issues.push(e);
            }
        }
        issues
    }
}

/// Endpoints receive bearer tokens and signed assertions, so only HTTPS is accepted.
pub fn validate_endpoint(url: &str, name: &str) -> Result<(), String> {
    if !url.starts_with("https://") {
        return Err(format!("{}: endpoint must use HTTPS, got: {}", name, url));
    }
    Ok(())
}
