//! API configuration

use serde::Deserialize;

use domain_fraud::EngineConfig;
use infra_db::PoolSettings;

use crate::auth::{issue_token, AuthError, Claims};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    /// Parses `json`; anything else is pretty text
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// JWT secret for authentication
    pub jwt_secret: String,
    /// JWT expiration in seconds
    pub jwt_expiration_secs: u64,
    /// Require a bearer token on `/api/v1`
    pub auth_enabled: bool,
    /// PostgreSQL audit store; the in-memory store is used when absent
    pub database_url: Option<String>,
    /// Audit store pool sizing (`API_DATABASE_POOL__...`)
    pub database_pool: PoolSettings,
    /// Log level
    pub log_level: String,
    pub log_format: LogFormat,
    /// Serialized local model artifact
    pub model_path: Option<String>,
    /// Remote inference endpoint, used when no local model loads
    pub inference_endpoint: Option<String>,
    /// External vendor risk service; blacklist only when absent
    pub vendor_api_url: Option<String>,
    pub vendor_api_key: Option<String>,
    /// OpenWeather key; weather checks are skipped when absent
    pub weather_api_key: Option<String>,
    /// Engine thresholds and timeouts (`API_ENGINE__...`)
    pub engine: EngineConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 3600,
            auth_enabled: false,
            database_url: None,
            database_pool: PoolSettings::default(),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            model_path: None,
            inference_endpoint: None,
            vendor_api_url: None,
            vendor_api_key: None,
            weather_api_key: None,
            engine: EngineConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::with_prefix("API")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Engine settings with the top-level model options applied
    pub fn engine_config(&self) -> EngineConfig {
        let mut engine = self.engine.clone();
        if let Some(path) = non_empty(&self.model_path) {
            engine.scorer.model_path = Some(path.to_string());
        }
        if let Some(url) = non_empty(&self.inference_endpoint) {
            engine.scorer.inference_endpoint = Some(url.to_string());
        }
        engine
    }

    /// Signs a token for `subject` with the configured secret and lifetime
    pub fn issue_token(&self, subject: &str, roles: Vec<String>) -> Result<String, AuthError> {
        issue_token(&Claims::new(subject, roles, self.jwt_expiration_secs), &self.jwt_secret)
    }

    pub fn database_url(&self) -> Option<&str> {
        non_empty(&self.database_url)
    }

    pub fn vendor_api_url(&self) -> Option<&str> {
        non_empty(&self.vendor_api_url)
    }

    pub fn weather_api_key(&self) -> Option<&str> {
        non_empty(&self.weather_api_key)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert!(!config.auth_enabled);
        assert!(config.database_url().is_none());
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_model_options_override_engine() {
        let config = ApiConfig {
            model_path: Some("/models/fraud.json".to_string()),
            inference_endpoint: Some("  ".to_string()),
            ..Default::default()
        };
        let engine = config.engine_config();
        assert_eq!(engine.scorer.model_path.as_deref(), Some("/models/fraud.json"));
        assert!(engine.scorer.inference_endpoint.is_none());
    }

    #[test]
    fn test_issued_token_uses_configured_lifetime() {
        let config = ApiConfig {
            jwt_expiration_secs: 120,
            ..Default::default()
        };
        let token = config.issue_token("analyst-1", vec![]).unwrap();
        let claims = crate::auth::verify_token(&token, &config.jwt_secret).unwrap();
        assert_eq!(claims.exp - claims.iat, 120);
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("text"), LogFormat::Pretty);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: ApiConfig =
            serde_json::from_str(r#"{"port": 9000, "engine": {"include_features": true}}"#).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "0.0.0.0");
        assert!(config.engine.include_features);
        assert_eq!(config.engine.rules.late_report_days, 7);
    }
}
