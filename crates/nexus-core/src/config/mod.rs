//! Client configuration.
//!
//! `ClientConfig` is read from an optional JSON file and then overridden by
//! `NEXUS_*` environment variables. Every field is optional in the file so a
//! partial config can be completed from the environment.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::{is_http_url, normalize_text_option};

pub const ENV_API_BASE_URL: &str = "NEXUS_API_BASE_URL";
pub const ENV_ACCESS_TOKEN: &str = "NEXUS_ACCESS_TOKEN";
pub const ENV_USER_ID: &str = "NEXUS_USER_ID";
pub const ENV_WEATHER_LOCATION: &str = "NEXUS_WEATHER_LOCATION";

const DEFAULT_DASHBOARD_TTL_SECS: u64 = 300;
const DEFAULT_TYPING_QUIET_PERIOD_MS: u64 = 2_000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub weather_location: Option<String>,
    #[serde(default = "default_dashboard_ttl_secs")]
    pub dashboard_ttl_secs: u64,
    #[serde(default = "default_typing_quiet_period_ms")]
    pub typing_quiet_period_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

const fn default_dashboard_ttl_secs() -> u64 {
    DEFAULT_DASHBOARD_TTL_SECS
}

const fn default_typing_quiet_period_ms() -> u64 {
    DEFAULT_TYPING_QUIET_PERIOD_MS
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: None,
            access_token: None,
            user_id: None,
            weather_location: None,
            dashboard_ttl_secs: DEFAULT_DASHBOARD_TTL_SECS,
            typing_quiet_period_ms: DEFAULT_TYPING_QUIET_PERIOD_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// File (when it exists) plus process environment.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => Self::load_from_path(path)?,
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.normalize()?;
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw).map_err(|error| {
            Error::Config(format!(
                "Failed to parse config at {}: {}",
                path.display(),
                error
            ))
        })
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let mut config = serde_json::from_str::<Self>(raw)?;
        config.normalize()?;
        Ok(config)
    }

    /// Override fields from the environment; unset or blank variables are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let read = |key: &str| normalize_text_option(lookup(key));
        if let Some(value) = read(ENV_API_BASE_URL) {
            self.api_base_url = Some(value);
        }
        if let Some(value) = read(ENV_ACCESS_TOKEN) {
            self.access_token = Some(value);
        }
        if let Some(value) = read(ENV_USER_ID) {
            self.user_id = Some(value);
        }
        if let Some(value) = read(ENV_WEATHER_LOCATION) {
            self.weather_location = Some(value);
        }
    }

    fn normalize(&mut self) -> Result<()> {
        self.api_base_url = normalize_text_option(self.api_base_url.take());
        self.access_token = normalize_text_option(self.access_token.take());
        self.user_id = normalize_text_option(self.user_id.take());
        self.weather_location = normalize_text_option(self.weather_location.take());

        if let Some(url) = self.api_base_url.as_deref() {
            if !is_http_url(url) {
                return Err(Error::Config(
                    "api_base_url must include http:// or https://".to_string(),
                ));
            }
            self.api_base_url = Some(url.trim_end_matches('/').to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub const fn dashboard_ttl(&self) -> Duration {
        Duration::from_secs(self.dashboard_ttl_secs)
    }

    pub const fn typing_quiet_period(&self) -> Duration {
        Duration::from_millis(self.typing_quiet_period_ms)
    }

    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
