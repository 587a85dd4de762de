use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use validator::Validate;

use crate::error::ConfigError;

// Top-level configuration, grouped by concern.
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub upload: UploadConfig,
    pub cors: CorsConfig,
    pub features: FeatureFlags,
}

// Application settings
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

// Request body limits
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsConfig {
    AnyOrigin,
    Origins(Vec<String>),
}

// Feature flags
#[derive(Debug, Clone)]
pub struct FeatureFlags {
    pub enable_web_form: bool,
}

/// Flat view of the environment, one field per variable.
#[derive(Debug, Deserialize, Validate)]
struct EnvSettings {
    host: String,
    #[validate(range(min = 1))]
    port: u16,
    environment: String,
    rust_log: String,
    log_format: String,
    #[validate(range(min = 1024, max = 67108864))]
    max_upload_bytes: usize,
    cors_allowed_origins: String,
    enable_web_form: bool,
}

impl Config {
    /// Reads `HOST`, `PORT`, `RUST_LOG`, ... from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(
            env::vars_os().filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?))),
        )
    }

    /// Same as `from_env`, but reads variables from `vars` only.
    pub fn from_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Result<Self, ConfigError>
    where
        K: Into<String>,
        V: Into<String>,
    {
        // Variable names are matched case-insensitively.
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into().to_ascii_lowercase(), v.into()))
            .collect();
        Self::load(vars)
    }

    fn load(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let settings: EnvSettings = config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8000)?
            .set_default("environment", "development")?
            .set_default("rust_log", "boarding_sequencer=debug,tower_http=debug")?
            .set_default("log_format", "text")?
            .set_default("max_upload_bytes", 1024 * 1024)?
            .set_default("cors_allowed_origins", "*")?
            .set_default("enable_web_form", true)?
            .add_source(config::Environment::default().try_parsing(true).source(Some(vars)))
            .build()?
            .try_deserialize()?;

        settings.validate()?;

        let log_format = match settings.log_format.to_ascii_lowercase().as_str() {
            "text" | "pretty" => LogFormat::Text,
            "json" => LogFormat::Json,
            _ => {
                return Err(ConfigError::Value {
                    key: "LOG_FORMAT",
                    value: settings.log_format,
                    reason: "expected text or json",
                })
            }
        };

        Ok(Config {
            app: AppConfig {
                host: settings.host,
                port: settings.port,
                environment: settings.environment,
                rust_log: settings.rust_log,
                log_format,
            },
            upload: UploadConfig {
                max_upload_bytes: settings.max_upload_bytes,
            },
            cors: parse_origins(&settings.cors_allowed_origins),
            features: FeatureFlags {
                enable_web_form: settings.enable_web_form,
            },
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            app: AppConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
                environment: "development".to_string(),
                rust_log: "boarding_sequencer=debug,tower_http=debug".to_string(),
                log_format: LogFormat::Text,
            },
            upload: UploadConfig {
                max_upload_bytes: 1024 * 1024,
            },
            cors: CorsConfig::AnyOrigin,
            features: FeatureFlags {
                enable_web_form: true,
            },
        }
    }
}

fn parse_origins(raw: &str) -> CorsConfig {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_owned)
        .collect();

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        CorsConfig::AnyOrigin
    } else {
        CorsConfig::Origins(origins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = Config::from_vars(Vec::<(String, String)>::new()).unwrap();

        assert_eq!(config.app.host, "0.0.0.0");
        assert_eq!(config.app.port, 8000);
        assert_eq!(config.app.log_format, LogFormat::Text);
        assert_eq!(config.upload.max_upload_bytes, 1024 * 1024);
        assert_eq!(config.cors, CorsConfig::AnyOrigin);
        assert!(config.features.enable_web_form);
    }

    #[test]
    fn variables_override_defaults() {
        let config = Config::from_vars([
            ("PORT", "9090"),
            ("LOG_FORMAT", "JSON"),
            ("MAX_UPLOAD_BYTES", "4096"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example"),
            ("ENABLE_WEB_FORM", "false"),
        ])
        .unwrap();

        assert_eq!(config.app.port, 9090);
        assert_eq!(config.app.log_format, LogFormat::Json);
        assert_eq!(config.upload.max_upload_bytes, 4096);
        assert_eq!(
            config.cors,
            CorsConfig::Origins(vec![
                "https://a.example".to_string(),
                "https://b.example".to_string()
            ])
        );
        assert!(!config.features.enable_web_form);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Config::from_vars([("PORT", "not-a-port")]).is_err());
        assert!(Config::from_vars([("PORT", "0")]).is_err());
        assert!(Config::from_vars([("MAX_UPLOAD_BYTES", "10")]).is_err());
        assert!(matches!(
            Config::from_vars([("LOG_FORMAT", "xml")]),
            Err(ConfigError::Value { key: "LOG_FORMAT", .. })
        ));
    }
}
