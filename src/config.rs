use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::params::Settings;
use crate::stream::DownloadMode;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid duration '{value}': {message}")]
    Duration { value: String, message: String },
}

/// Local client configuration. `settings` overrides the blob persisted
/// on the backend; when absent the client fetches it at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub settings: Option<Settings>,
    #[serde(default)]
    pub stream: StreamConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    #[serde(default = "default_debounce")]
    pub debounce: String,
    #[serde(default)]
    pub download_mode: DownloadMode,
}

fn default_debounce() -> String {
    "1s".to_string()
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self { debounce: default_debounce(), download_mode: DownloadMode::default() }
    }
}

impl StreamConfig {
    pub fn debounce(&self) -> Result<Duration, ConfigError> {
        humantime::parse_duration(self.debounce.trim()).map_err(|e| ConfigError::Duration {
            value: self.debounce.clone(),
            message: e.to_string(),
        })
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.stream.debounce()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_gets_defaults() {
        let config: Config = serde_yaml::from_str("server: {}\n").unwrap();
        assert_eq!(config.server.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.stream.debounce().unwrap(), Duration::from_secs(1));
        assert_eq!(config.stream.download_mode, DownloadMode::Selected);
        assert!(config.settings.is_none());
    }

    #[test]
    fn full_config_parses() {
        let yaml = r#"
server:
  base_url: http://observatory.local:8000
stream:
  debounce: 750ms
  download_mode: filtered
settings:
  telescope: {focal_length: 600}
  camera: {sensor_width: 23.5, sensor_height: 15.7}
  location: {latitude: 55.7, longitude: 13.19}
  catalogs: [messier, ngc]
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.stream.debounce().unwrap(), Duration::from_millis(750));
        assert_eq!(config.stream.download_mode, DownloadMode::Filtered);
        let settings = config.settings.unwrap();
        assert_eq!(settings.catalogs.len(), 2);
    }

    #[test]
    fn bad_debounce_is_rejected() {
        let config: Config =
            serde_yaml::from_str("server: {}\nstream: {debounce: soon}\n").unwrap();
        assert!(config.stream.debounce().is_err());
    }
}
