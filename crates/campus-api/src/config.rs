//! Backend connection settings.

use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::transport::DEFAULT_TIMEOUT;

pub const BASE_URL_VAR: &str = "CAMPUS_API_URL";
pub const TIMEOUT_VAR: &str = "CAMPUS_API_TIMEOUT_SECS";
pub const DEFAULT_BASE_URL: &str = "http://localhost:4000/api";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a whole number of seconds, got `{value}`")]
    InvalidTimeout { var: &'static str, value: String },

    #[error("{var} must be an http(s) URL, got `{value}`")]
    InvalidBaseUrl { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    /// `None` disables the client-side timeout.
    pub timeout: Option<Duration>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

impl ApiConfig {
    /// Reads [`BASE_URL_VAR`] and [`TIMEOUT_VAR`], falling back to defaults.
    /// A timeout of `0` disables it.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(BASE_URL_VAR) {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(ConfigError::InvalidBaseUrl {
                    var: BASE_URL_VAR,
                    value,
                });
            }
            config.base_url = value;
        }

        if let Some(value) = lookup(TIMEOUT_VAR) {
            let secs: u64 = value.trim().parse().map_err(|_| ConfigError::InvalidTimeout {
                var: TIMEOUT_VAR,
                value: value.clone(),
            })?;
            config.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ApiConfig::default());
    }

    #[test]
    fn test_reads_overrides() {
        let config = ApiConfig::from_lookup(lookup(&[
            (BASE_URL_VAR, "https://school.example/api"),
            (TIMEOUT_VAR, "5"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://school.example/api");
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_zero_timeout_disables_it() {
        let config = ApiConfig::from_lookup(lookup(&[(TIMEOUT_VAR, "0")])).unwrap();
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            ApiConfig::from_lookup(lookup(&[(TIMEOUT_VAR, "soon")])),
            Err(ConfigError::InvalidTimeout { .. })
        ));
        assert!(matches!(
            ApiConfig::from_lookup(lookup(&[(BASE_URL_VAR, "localhost")])),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
    }
}
