// ABOUTME: TOML configuration for the remote service, polling and database
// ABOUTME: All fields have defaults; secrets can come from the environment

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const API_KEY_ENV: &str = "MESHY_API_KEY";
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub remote: RemoteConfig,
    pub poll: PollConfig,
    pub database: DatabaseConfig,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
    pub art_style: String,
    pub enable_pbr: bool,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.meshy.ai/v1".to_string(),
            api_key: None,
            request_timeout_secs: 60,
            art_style: "realistic".to_string(),
            enable_pbr: true,
        }
    }
}

// Hand-written so the API key never ends up in logs.
impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("art_style", &self.art_style)
            .field("enable_pbr", &self.enable_pbr)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub max_attempts: u32,
    pub interval_secs: u64,
    pub tolerate_transport_faults: bool,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            interval_secs: 10,
            tolerate_transport_faults: false,
        }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub status_marker: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            status_marker: "THREE_D_GEN".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&raw)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Config = toml::from_str(raw).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Fills secrets from the process environment, which wins over the file.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(API_KEY_ENV).filter(|v| !v.is_empty()) {
            self.remote.api_key = Some(key);
        }
        if let Some(url) = lookup(DATABASE_URL_ENV).filter(|v| !v.is_empty()) {
            self.database.url = Some(url);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll.max_attempts == 0 {
            bail!("poll.max_attempts must be at least 1");
        }
        if self.remote.request_timeout_secs == 0 {
            bail!("remote.request_timeout_secs must be at least 1");
        }
        if self.remote.base_url.trim().is_empty() {
            bail!("remote.base_url must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.poll.max_attempts, 30);
        assert_eq!(config.poll.interval(), Duration::from_secs(10));
        assert!(!config.poll.tolerate_transport_faults);
        assert_eq!(config.remote.request_timeout_secs, 60);
        assert_eq!(config.remote.art_style, "realistic");
        assert!(config.remote.enable_pbr);
        assert_eq!(config.database.status_marker, "THREE_D_GEN");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[remote]
base_url = "http://localhost:9000"
api_key = "file-key"

[poll]
max_attempts = 5
interval_secs = 2
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.remote.base_url, "http://localhost:9000");
        assert_eq!(config.remote.api_key.as_deref(), Some("file-key"));
        assert_eq!(config.poll.max_attempts, 5);
        assert_eq!(config.poll.interval_secs, 2);
        assert_eq!(config.remote.request_timeout_secs, 60);
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let err = Config::from_toml_str("[poll]\nmax_attempts = 0\n").unwrap_err();
        assert!(format!("{:#}", err).contains("max_attempts"));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config::from_toml_str("[remote]\napi_key = \"file-key\"\n").unwrap();
        config.apply_env_from(|name| match name {
            API_KEY_ENV => Some("env-key".to_string()),
            DATABASE_URL_ENV => Some("postgres://localhost/assets".to_string()),
            _ => None,
        });
        assert_eq!(config.remote.api_key.as_deref(), Some("env-key"));
        assert_eq!(
            config.database.url.as_deref(),
            Some("postgres://localhost/assets")
        );
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = RemoteConfig {
            api_key: Some("secret-value".to_string()),
            ..RemoteConfig::default()
        };
        assert!(!format!("{:?}", config).contains("secret-value"));
    }

    #[test]
    fn test_missing_file() {
        assert!(Config::load(Path::new("/nonexistent/mesh-forge.toml")).is_err());
    }
}
