//! Client configuration with YAML support

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// SDCM client configuration
///
/// Can be loaded from YAML or JSON, or constructed programmatically. Every
/// section has defaults that target the public service, so an empty document
/// is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SdcmConfig {
    /// Endpoint and identity settings
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// HTTP timeouts (unset means transport defaults)
    #[serde(default)]
    pub timeouts: TimeoutsConfig,

    /// Submission status polling
    #[serde(default)]
    pub poll: PollConfig,
}

/// Connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Identity provider base URL
    #[serde(default = "default_login_url")]
    pub login_url: String,

    /// Management API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Audience requested in the token grant
    #[serde(default = "default_resource")]
    pub resource: String,

    /// User-Agent header sent with API requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            login_url: default_login_url(),
            api_url: default_api_url(),
            resource: default_resource(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_login_url() -> String {
    "https://login.microsoftonline.com".to_string()
}

fn default_api_url() -> String {
    "https://manage.devcenter.microsoft.com".to_string()
}

fn default_resource() -> String {
    "https://manage.devcenter.microsoft.com".to_string()
}

fn default_user_agent() -> String {
    concat!("sdcm-client/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Timeout configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeoutsConfig {
    /// Whole-request timeout in milliseconds
    #[serde(default)]
    pub request_ms: Option<u64>,

    /// Connect timeout in milliseconds
    #[serde(default)]
    pub connect_ms: Option<u64>,
}

/// Poll loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Delay between status checks in milliseconds (default: 5s)
    #[serde(default = "default_poll_interval")]
    pub interval_ms: u64,

    /// Upper bound on a whole wait in milliseconds. Unbounded when unset.
    #[serde(default)]
    pub wait_timeout_ms: Option<u64>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval(),
            wait_timeout_ms: None,
        }
    }
}

fn default_poll_interval() -> u64 {
    5_000 // 5 seconds
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn wait_timeout(&self) -> Option<Duration> {
        self.wait_timeout_ms.map(Duration::from_millis)
    }
}

impl SdcmConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Parse configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Serialize configuration to YAML
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }

    /// Create a builder for programmatic configuration
    pub fn builder() -> SdcmConfigBuilder {
        SdcmConfigBuilder::new()
    }
}

/// Builder for SdcmConfig
#[derive(Debug, Default)]
pub struct SdcmConfigBuilder {
    config: SdcmConfig,
}

impl SdcmConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the identity provider base URL
    pub fn login_url(mut self, url: impl Into<String>) -> Self {
        self.config.connection.login_url = url.into();
        self
    }

    /// Set the management API base URL
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.connection.api_url = url.into();
        self
    }

    /// Set the token audience
    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.config.connection.resource = resource.into();
        self
    }

    /// Set the User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.connection.user_agent = user_agent.into();
        self
    }

    /// Set request timeout in milliseconds
    pub fn request_timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeouts.request_ms = Some(ms);
        self
    }

    /// Set connect timeout in milliseconds
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeouts.connect_ms = Some(ms);
        self
    }

    /// Set status poll interval in milliseconds
    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll.interval_ms = ms;
        self
    }

    /// Bound `wait` to the given number of milliseconds
    pub fn wait_timeout_ms(mut self, ms: u64) -> Self {
        self.config.poll.wait_timeout_ms = Some(ms);
        self
    }

    /// Build the configuration
    pub fn build(self) -> SdcmConfig {
        self.config
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SdcmConfig::default();
        assert_eq!(
            config.connection.login_url,
            "https://login.microsoftonline.com"
        );
        assert_eq!(
            config.connection.api_url,
            "https://manage.devcenter.microsoft.com"
        );
        assert_eq!(
            config.connection.resource,
            "https://manage.devcenter.microsoft.com"
        );
        assert!(config.connection.user_agent.starts_with("sdcm-client/"));
        assert_eq!(config.timeouts.request_ms, None);
        assert_eq!(config.poll.interval(), Duration::from_secs(5));
        assert_eq!(config.poll.wait_timeout(), None);
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r#"
connection:
  api_url: "http://localhost:8080"
  user_agent: "driver-pipeline/2.1"

timeouts:
  request_ms: 60000

poll:
  interval_ms: 250
  wait_timeout_ms: 3600000
"#;

        let config = SdcmConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.connection.api_url, "http://localhost:8080");
        assert_eq!(
            config.connection.login_url,
            "https://login.microsoftonline.com"
        );
        assert_eq!(config.connection.user_agent, "driver-pipeline/2.1");
        assert_eq!(config.timeouts.request_ms, Some(60000));
        assert_eq!(config.timeouts.connect_ms, None);
        assert_eq!(config.poll.interval_ms, 250);
        assert_eq!(config.poll.wait_timeout_ms, Some(3_600_000));
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = SdcmConfig::from_yaml("{}").unwrap();
        assert_eq!(config.poll.interval_ms, 5_000);
    }

    #[test]
    fn test_json_parsing() {
        let config = SdcmConfig::from_json(r#"{"poll": {"interval_ms": 10}}"#).unwrap();
        assert_eq!(config.poll.interval_ms, 10);
        assert!(SdcmConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_builder() {
        let config = SdcmConfig::builder()
            .login_url("http://127.0.0.1:1")
            .api_url("http://127.0.0.1:2")
            .resource("urn:test")
            .request_timeout_ms(1_000)
            .connect_timeout_ms(500)
            .poll_interval_ms(20)
            .wait_timeout_ms(200)
            .build();

        assert_eq!(config.connection.login_url, "http://127.0.0.1:1");
        assert_eq!(config.connection.api_url, "http://127.0.0.1:2");
        assert_eq!(config.connection.resource, "urn:test");
        assert_eq!(config.timeouts.connect_ms, Some(500));
        assert_eq!(config.poll.interval(), Duration::from_millis(20));
        assert_eq!(config.poll.wait_timeout(), Some(Duration::from_millis(200)));
    }

    #[test]
    fn test_to_yaml() {
        let config = SdcmConfig::builder().api_url("http://localhost:8080").build();

        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("api_url"));
        assert!(yaml.contains("http://localhost:8080"));
    }
}
