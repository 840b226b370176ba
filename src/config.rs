use crate::session::DEFAULT_SESSION_KEY;
use crate::settings::DEFAULT_SETTINGS_KEY;
use crate::store::Backing;
use crate::types::ThemeMode;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_KEYRING_SERVICE: &str = "com.camwatch.app";
pub const CONFIG_PATH_ENV: &str = "CAMWATCH_CONFIG";

const ENV_BACKING: &str = "CAMWATCH_BACKING";
const ENV_AUTH_DELAY_MS: &str = "CAMWATCH_AUTH_DELAY_MS";
const ENV_DEFAULT_THEME: &str = "CAMWATCH_DEFAULT_THEME";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value `{value}` for {name}")]
    InvalidEnv { name: &'static str, value: String },
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub keyring_service: String,
    pub session_key: String,
    pub settings_key: String,
    pub backing: Backing,
    pub auth_delay_ms: u64,
    pub default_theme: ThemeMode,
    pub session_ttl_hours: Option<u32>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            keyring_service: DEFAULT_KEYRING_SERVICE.to_string(),
            session_key: DEFAULT_SESSION_KEY.to_string(),
            settings_key: DEFAULT_SETTINGS_KEY.to_string(),
            backing: Backing::Auto,
            auth_delay_ms: 1000,
            default_theme: ThemeMode::Dark,
            session_ttl_hours: None,
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// File named by `CAMWATCH_CONFIG` (if any), then environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let base = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        base.with_overrides(|name| std::env::var(name).ok())
    }

    /// Applies `CAMWATCH_*` overrides read through `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_BACKING) {
            self.backing = Backing::parse(&value).ok_or(ConfigError::InvalidEnv {
                name: ENV_BACKING,
                value,
            })?;
        }
        if let Some(value) = lookup(ENV_AUTH_DELAY_MS) {
            self.auth_delay_ms = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: ENV_AUTH_DELAY_MS,
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup(ENV_DEFAULT_THEME) {
            self.default_theme = ThemeMode::parse(&value).ok_or(ConfigError::InvalidEnv {
                name: ENV_DEFAULT_THEME,
                value,
            })?;
        }
        Ok(self)
    }

    pub fn session_ttl(&self) -> Option<chrono::Duration> {
        self.session_ttl_hours
            .map(|hours| chrono::Duration::hours(i64::from(hours)))
    }
}
