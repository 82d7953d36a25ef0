mod encoding_table;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::error::{AppError, Result};

pub use encoding_table::load_encoding_table;

const CONFIG_PATH_VAR: &str = "HEAPS_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "heaps.toml";
const ENV_PREFIX: &str = "HEAPS_";

/// Runtime settings for the dashboard backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,

    /// JSON model file; the app starts without predictions when absent
    pub model_path: PathBuf,

    /// TOML file replacing the built-in student encoding table
    pub encoding_table_path: Option<PathBuf>,

    pub max_upload_bytes: usize,
    pub preview_rows: usize,

    /// Sessions untouched for this long are dropped
    pub session_idle_secs: u64,

    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            model_path: PathBuf::from("trained-model.json"),
            encoding_table_path: None,
            max_upload_bytes: 10 * 1024 * 1024,
            preview_rows: 5,
            session_idle_secs: 60 * 60,
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Defaults, then the TOML file, then `HEAPS_*` environment variables
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::from_figment(
            Figment::from(Serialized::defaults(AppConfig::default()))
                .merge(Toml::file(path))
                .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"])),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: AppConfig = figment
            .extract()
            .map_err(|e| AppError::ConfigurationError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(AppError::ConfigurationError("host must not be empty".to_string()));
        }
        if self.max_upload_bytes == 0 {
            return Err(AppError::ConfigurationError(
                "max_upload_bytes must be > 0".to_string(),
            ));
        }
        if self.preview_rows == 0 {
            return Err(AppError::ConfigurationError(
                "preview_rows must be > 0".to_string(),
            ));
        }
        if self.session_idle_secs == 0 {
            return Err(AppError::ConfigurationError(
                "session_idle_secs must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn session_idle_ttl(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::from_figment(defaults()).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.port, 8501);
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let figment = defaults().merge(Toml::string(
            r#"
            port = 9000
            model_path = "models/risk.json"
            encoding_table_path = "fields.toml"
            "#,
        ));
        let config = AppConfig::from_figment(figment).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.model_path, PathBuf::from("models/risk.json"));
        assert_eq!(config.encoding_table_path, Some(PathBuf::from("fields.toml")));
        assert_eq!(config.preview_rows, 5);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let figment = defaults().merge(Toml::string("preview_rows = 0"));
        let err = AppConfig::from_figment(figment).unwrap_err();
        assert!(matches!(err, AppError::ConfigurationError(_)));

        let figment = defaults().merge(Toml::string("session_idle_secs = 0"));
        assert!(AppConfig::from_figment(figment).is_err());

        let figment = defaults().merge(Toml::string("port = \"not a port\""));
        assert!(AppConfig::from_figment(figment).is_err());
    }
}
