use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::grid::GridLimits;

/// Document decoded when neither the command line nor the environment names one.
const DEMO_DOCUMENT_URL: &str = "https://docs.google.com/document/d/e/2PACX-1vTER-wL5E8YC9pxDx43gk8elds59GtUUk4nJo_ZWagbnrH0NFvMXlw6VWFLpf5tWTZIT9P9oLIoFJ6A/pub";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub max_width: usize,
    pub max_height: usize,
}

impl Default for Settings {
    fn default() -> Self {
        let limits = GridLimits::default();
        Settings {
            url: DEMO_DOCUMENT_URL.to_string(),
            timeout_secs: 30,
            user_agent: format!("grid_decoder/{}", env!("CARGO_PKG_VERSION")),
            max_width: limits.max_width,
            max_height: limits.max_height,
        }
    }
}

impl Settings {
    /// Defaults, then `grid_decoder.toml` if present, then `GRID_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("grid_decoder").required(false))
            .add_source(Environment::with_prefix("GRID"))
            .build()?;
        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        config.try_deserialize()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn limits(&self) -> GridLimits {
        GridLimits {
            max_width: self.max_width,
            max_height: self.max_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::builder().build().unwrap();
        let s = Settings::from_config(config).unwrap();
        assert_eq!(s.url, DEMO_DOCUMENT_URL);
        assert_eq!(s.timeout(), Duration::from_secs(30));
        assert_eq!(s.limits(), GridLimits::default());
        assert!(s.user_agent.starts_with("grid_decoder/"));
    }

    #[test]
    fn overrides_replace_single_fields() {
        let config = Config::builder()
            .set_override("url", "https://example.com/doc")
            .unwrap()
            .set_override("timeout_secs", 5)
            .unwrap()
            .set_override("max_width", 80)
            .unwrap()
            .build()
            .unwrap();
        let s = Settings::from_config(config).unwrap();
        assert_eq!(s.url, "https://example.com/doc");
        assert_eq!(s.timeout_secs, 5);
        assert_eq!(s.max_width, 80);
        assert_eq!(s.max_height, GridLimits::default().max_height);
    }

    #[test]
    fn bad_number_is_rejected() {
        let config = Config::builder()
            .set_override("timeout_secs", "soon")
            .unwrap()
            .build()
            .unwrap();
        assert!(Settings::from_config(config).is_err());
    }
}
