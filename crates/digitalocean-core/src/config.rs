//! Configuration structures for DigitalOcean clients.
//!
//! This module provides the serializable client configuration: the API base
//! URL, the access token, and request settings, validated with `validator`.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Default base URL of the DigitalOcean API.
pub const DEFAULT_API_URL: &str = "https://api.digitalocean.com/";

/// Configuration for a DigitalOcean client instance.
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct DigitalOceanConfig {
    /// API base URL
    #[validate(url)]
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Personal access token sent as a bearer token
    #[validate(length(min = 1))]
    #[serde(default, skip_serializing)]
    pub token: Option<String>,

    /// User agent override
    #[validate(length(min = 1))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

const fn default_request_timeout_secs() -> u64 {
    30
}

impl DigitalOceanConfig {
    /// Create a new client configuration for the given API base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or validation fails.
    pub fn new(api_url: impl Into<String>) -> Result<Self, Error> {
        let config = Self {
            api_url: api_url.into(),
            ..Self::default()
        };

        config
            .validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))?;

        Ok(config)
    }

    /// Set the access token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Parse the API base URL.
    ///
    /// A trailing slash is appended when missing so that relative request
    /// paths resolve beneath the base path.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn parse_api_url(&self) -> Result<Url, Error> {
        let raw = if self.api_url.ends_with('/') {
            self.api_url.clone()
        } else {
            format!("{}/", self.api_url)
        };

        Url::parse(&raw).map_err(|e| Error::ConfigError(format!("Invalid API URL: {e}")))
    }
}

impl Default for DigitalOceanConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token: None,
            user_agent: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl fmt::Debug for DigitalOceanConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigitalOceanConfig")
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("user_agent", &self.user_agent)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new() {
        let config = DigitalOceanConfig::new("https://api.example.com").unwrap();
        assert_eq!(config.api_url, "https://api.example.com");
        assert!(config.token.is_none());
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_config_invalid_url() {
        let result = DigitalOceanConfig::new("not-a-url");
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_config_builder() {
        let config = DigitalOceanConfig::default()
            .with_token("dop_v1_secret")
            .with_user_agent("image-mover/1.0")
            .with_timeout(60);

        assert_eq!(config.token.as_deref(), Some("dop_v1_secret"));
        assert_eq!(config.user_agent.as_deref(), Some("image-mover/1.0"));
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_config_default() {
        let config = DigitalOceanConfig::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_api_url_appends_trailing_slash() {
        let config = DigitalOceanConfig::new("http://localhost:8080/proxy").unwrap();
        let url = config.parse_api_url().unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/proxy/");
        assert_eq!(
            url.join("v2/images/1/actions").unwrap().path(),
            "/proxy/v2/images/1/actions"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = DigitalOceanConfig::default().with_token("dop_v1_secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("dop_v1_secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_token_never_serialized() {
        let config = DigitalOceanConfig::default().with_token("dop_v1_secret");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("dop_v1_secret"));

        let deserialized: DigitalOceanConfig =
            serde_json::from_str(r#"{"token":"from-file","request_timeout_secs":10}"#).unwrap();
        assert_eq!(deserialized.token.as_deref(), Some("from-file"));
        assert_eq!(deserialized.api_url, DEFAULT_API_URL);
        assert_eq!(deserialized.request_timeout_secs, 10);
    }

    #[test]
    fn test_config_validation_timeout_range() {
        let mut config = DigitalOceanConfig::default();
        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());

        config.request_timeout_secs = 301;
        assert!(config.validate().is_err());

        config.request_timeout_secs = 30;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_empty_token() {
        let config = DigitalOceanConfig::default().with_token("");
        assert!(config.validate().is_err());
    }
}
