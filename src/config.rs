//! Client configuration
//!
//! Settings come from an optional YAML file and are overlaid with
//! environment variables:
//!
//! ```yaml
//! base_url: https://api.up.com.au/api/v1
//! timeout_secs: 30
//! max_retries: 3
//! requests_per_second: 10
//! page_size: 100
//! ```
//!
//! The access token is normally taken from `API_TOKEN` rather than stored in
//! the file.

use crate::auth::AuthConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Production API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.up.com.au/api/v1";

/// Environment variable holding the personal access token
pub const TOKEN_ENV: &str = "API_TOKEN";

/// Environment variable overriding the base URL
pub const BASE_URL_ENV: &str = "UP_BASE_URL";

/// Configuration for [`crate::client::UpClient`]
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Personal access token
    #[serde(default, skip_serializing)]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries on transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Client-side request rate (0 disables throttling)
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    /// Default `page[size]` for list endpoints
    #[serde(default)]
    pub page_size: Option<u32>,

    /// Stop following `links.next` after this many pages
    #[serde(default)]
    pub max_pages: Option<u32>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_requests_per_second() -> u32 {
    10
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            requests_per_second: default_requests_per_second(),
            page_size: None,
            max_pages: None,
        }
    }
}

impl ClientConfig {
    /// Config with the given token and defaults for everything else
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Self::default()
        }
    }

    /// Defaults overlaid with the environment
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Load a YAML file, then overlay the environment
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml_str(&content)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Overlay values looked up through `lookup`.
    ///
    /// Environment values win over file values.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(TOKEN_ENV) {
            self.token = Some(token);
        }
        if let Some(url) = lookup(BASE_URL_ENV).filter(|u| !u.is_empty()) {
            self.base_url = url;
        }
    }

    /// Check required fields and value ranges
    pub fn validate(&self) -> Result<()> {
        if self.token.as_deref().map_or(true, |t| t.trim().is_empty()) {
            return Err(Error::missing_field(TOKEN_ENV));
        }
        url::Url::parse(&self.base_url)?;
        if self.timeout_secs == 0 {
            return Err(Error::config("timeout_secs must be greater than zero"));
        }
        if self.page_size == Some(0) {
            return Err(Error::config("page_size must be greater than zero"));
        }
        Ok(())
    }

    /// Auth settings derived from the token
    pub fn auth(&self) -> Result<AuthConfig> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| Error::missing_field(TOKEN_ENV))?;
        AuthConfig::bearer(token)
    }

    /// Transport settings derived from this config
    pub fn http_config(&self) -> HttpClientConfig {
        let builder = HttpClientConfig::builder()
            .base_url(self.base_url.clone())
            .timeout(Duration::from_secs(self.timeout_secs))
            .max_retries(self.max_retries);

        if self.requests_per_second == 0 {
            builder.no_rate_limit().build()
        } else {
            builder
                .rate_limit(RateLimiterConfig::per_second(self.requests_per_second))
                .build()
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("requests_per_second", &self.requests_per_second)
            .field("page_size", &self.page_size)
            .field("max_pages", &self.max_pages)
            .finish()
    }
}
