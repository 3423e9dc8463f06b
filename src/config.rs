use crate::core::currency::CurrencyCode;
use crate::fx::cache::DEFAULT_TTL_HOURS;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_PIVOT: &str = "EMI_PIVOT_CURRENCY";
pub const ENV_CACHE_HOURS: &str = "EMI_RATE_CACHE_HOURS";
pub const ENV_RATES_FILE: &str = "EMI_RATES_FILE";

/// Errors arising from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Runtime settings for the calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    /// Currency every rate is quoted against, and the currency loan inputs
    /// are entered in.
    pub pivot: CurrencyCode,
    /// How long a fetched rate table is served before refreshing.
    pub cache_ttl_hours: i64,
    /// Saved rate body to load rates from, if any.
    pub rates_file: Option<PathBuf>,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            pivot: CurrencyCode::default_pivot(),
            cache_ttl_hours: DEFAULT_TTL_HOURS,
            rates_file: None,
        }
    }
}

impl CalculatorConfig {
    /// Defaults overridden by `EMI_PIVOT_CURRENCY`, `EMI_RATE_CACHE_HOURS`
    /// and `EMI_RATES_FILE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`CalculatorConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_overrides(lookup)?;
        Ok(config)
    }

    /// Read a JSON config file; missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply variable overrides on top of the current values.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(value) = lookup(ENV_PIVOT) {
            self.pivot = CurrencyCode::parse(&value).map_err(|e| ConfigError::InvalidValue {
                key: ENV_PIVOT,
                value: value.clone(),
                reason: e.to_string(),
            })?;
        }
        if let Some(value) = lookup(ENV_CACHE_HOURS) {
            self.cache_ttl_hours = value.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidValue {
                    key: ENV_CACHE_HOURS,
                    value: value.clone(),
                    reason: e.to_string(),
                }
            })?;
        }
        if let Some(value) = lookup(ENV_RATES_FILE) {
            if !value.trim().is_empty() {
                self.rates_file = Some(PathBuf::from(value));
            }
        }
        self.validate()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        // Upper bound of one year keeps the TTL well inside chrono's range.
        if !(1..=24 * 366).contains(&self.cache_ttl_hours) {
            return Err(ConfigError::InvalidValue {
                key: ENV_CACHE_HOURS,
                value: self.cache_ttl_hours.to_string(),
                reason: "must be between 1 and 8784 hours".to_string(),
            });
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::hours(self.cache_ttl_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CalculatorConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, CalculatorConfig::default());
        assert_eq!(config.pivot.as_str(), "USD");
        assert_eq!(config.cache_ttl(), Duration::hours(4));
    }

    #[test]
    fn test_overrides() {
        let config = CalculatorConfig::from_lookup(lookup(&[
            (ENV_PIVOT, "eur"),
            (ENV_CACHE_HOURS, " 6 "),
            (ENV_RATES_FILE, "/tmp/rates.json"),
        ]))
        .unwrap();
        assert_eq!(config.pivot, CurrencyCode::new("EUR"));
        assert_eq!(config.cache_ttl_hours, 6);
        assert_eq!(config.rates_file, Some(PathBuf::from("/tmp/rates.json")));
    }

    #[test]
    fn test_invalid_values() {
        let err = CalculatorConfig::from_lookup(lookup(&[(ENV_CACHE_HOURS, "four")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: ENV_CACHE_HOURS, .. }));

        let err = CalculatorConfig::from_lookup(lookup(&[(ENV_CACHE_HOURS, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = CalculatorConfig::from_lookup(lookup(&[(ENV_PIVOT, "$$")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: ENV_PIVOT, .. }));
    }

    #[test]
    fn test_partial_json() {
        let config: CalculatorConfig = serde_json::from_str(r#"{"cache_ttl_hours": 2}"#).unwrap();
        assert_eq!(config.cache_ttl_hours, 2);
        assert_eq!(config.pivot, CurrencyCode::default_pivot());
        assert!(config.rates_file.is_none());
    }

    #[test]
    fn test_json_pivot_is_normalized() {
        let config: CalculatorConfig = serde_json::from_str(r#"{"pivot": " eur "}"#).unwrap();
        assert_eq!(config.pivot, CurrencyCode::new("EUR"));

        assert!(serde_json::from_str::<CalculatorConfig>(r#"{"pivot": "$$"}"#).is_err());
    }

    #[test]
    fn test_json_file_rejects_bad_pivot() {
        let path = std::env::temp_dir().join(format!("emi-insights-config-{}.json", std::process::id()));
        fs::write(&path, r#"{"pivot": "$$", "cache_ttl_hours": 2}"#).unwrap();
        let result = CalculatorConfig::from_json_file(&path);
        fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = CalculatorConfig::from_json_file(Path::new("/nonexistent/emi.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
