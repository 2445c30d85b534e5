//! Engine configuration.
//!
//! There is no config file. Defaults cover the published dataset and the
//! current host markup; a handful of environment variables override them.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use fceplus_dataset::{DatasetClient, DEFAULT_DATASET_URL};

use crate::error::ConfigError;

/// Environment variable overriding [`EngineConfig::dataset_url`].
pub const ENV_DATASET_URL: &str = "FCEPLUS_DATASET_URL";
/// Environment variable overriding [`EngineConfig::log_level`].
pub const ENV_LOG: &str = "FCEPLUS_LOG";
/// Environment variable overriding [`EngineConfig::request_timeout_secs`].
pub const ENV_TIMEOUT_SECS: &str = "FCEPLUS_TIMEOUT_SECS";

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Reference dataset location.
    #[serde(default = "default_dataset_url")]
    pub dataset_url: String,

    /// Log verbosity threshold (an `EnvFilter` directive).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dataset request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Location fragments that identify the static semester-schedule listing.
    #[serde(default = "default_static_listing_markers")]
    pub static_listing_markers: Vec<String>,

    /// Renumbered courses, new id → previous id.
    #[serde(default = "default_course_aliases")]
    pub course_aliases: BTreeMap<String, String>,
}

fn default_dataset_url() -> String {
    DEFAULT_DATASET_URL.to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_static_listing_markers() -> Vec<String> {
    vec!["semester-schedule".to_string()]
}

fn default_course_aliases() -> BTreeMap<String, String> {
    [
        ("17214", "15214"),
        ("17514", "15214"),
        ("17413", "15413"),
        ("17437", "15437"),
        ("17637", "15637"),
        ("17819", "15819"),
    ]
    .into_iter()
    .map(|(new, old)| (new.to_string(), old.to_string()))
    .collect()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dataset_url: default_dataset_url(),
            log_level: default_log_level(),
            request_timeout_secs: default_request_timeout_secs(),
            static_listing_markers: default_static_listing_markers(),
            course_aliases: default_course_aliases(),
        }
    }
}

impl EngineConfig {
    /// Defaults with process environment overrides applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Defaults with overrides read through `var`.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(url) = var(ENV_DATASET_URL) {
            config.dataset_url = url;
        }
        if let Some(level) = var(ENV_LOG) {
            config.log_level = level;
        }
        if let Some(raw) = var(ENV_TIMEOUT_SECS) {
            config.request_timeout_secs =
                raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    field: "request_timeout_secs".to_string(),
                    message: format!("'{}' is not a whole number of seconds", raw),
                })?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.dataset_url)?;
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.static_listing_markers.iter().any(|m| m.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "static_listing_markers".to_string(),
                message: "markers must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// HTTP client for the configured dataset.
    pub fn dataset_client(&self) -> Result<DatasetClient, fceplus_dataset::DatasetError> {
        Ok(DatasetClient::new(&self.dataset_url, self.request_timeout())?
            .with_aliases(self.course_aliases.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.dataset_url, DEFAULT_DATASET_URL);
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.static_listing_markers, vec!["semester-schedule"]);
        assert_eq!(config.course_aliases.get("17214").map(String::as_str), Some("15214"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let config = EngineConfig::from_vars(vars(&[
            (ENV_DATASET_URL, "http://localhost:9000/fce.json"),
            (ENV_LOG, "debug"),
            (ENV_TIMEOUT_SECS, " 5 "),
        ]))
        .unwrap();
        assert_eq!(config.dataset_url, "http://localhost:9000/fce.json");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.request_timeout_secs, 5);
    }

    #[test]
    fn test_env_timeout_not_a_number() {
        let err = EngineConfig::from_vars(vars(&[(ENV_TIMEOUT_SECS, "soon")])).unwrap_err();
        assert!(err.to_string().contains("soon"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = EngineConfig::default();
        config.dataset_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl(_))));

        let mut config = EngineConfig::default();
        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.static_listing_markers.push("  ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"log_level": "info", "static_listing_markers": ["sched"]}"#)
                .unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.static_listing_markers, vec!["sched"]);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.course_aliases.len(), 6);
    }

    #[test]
    fn test_dataset_client_uses_url() {
        let config = EngineConfig::default();
        let client = config.dataset_client().unwrap();
        assert_eq!(client.url().as_str(), DEFAULT_DATASET_URL);
    }
}
