//! Engine configuration.

use serde::Deserialize;
use thiserror::Error;

use crate::library::save::DEFAULT_STORAGE_KEY;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("storage_key must not be empty")]
    EmptyStorageKey,
}

/// Runtime knobs. Every field has a default, so `{}` is a valid config.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Save slot name.
    pub storage_key: String,
    pub autosave_interval_ms: u32,
    /// Upper bound for one simulation step.
    pub max_frame_delta_secs: f64,
    /// Cap on offline progress credited at load.
    pub max_offline_secs: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            autosave_interval_ms: 30_000,
            max_frame_delta_secs: 1.0,
            max_offline_secs: 86_400.0,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.is_empty() {
            return Err(ConfigError::EmptyStorageKey);
        }
        let positive = [
            ("autosave_interval_ms", self.autosave_interval_ms as f64),
            ("max_frame_delta_secs", self.max_frame_delta_secs),
        ];
        for (field, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        if !(self.max_offline_secs >= 0.0) {
            return Err(ConfigError::NotPositive {
                field: "max_offline_secs",
                value: self.max_offline_secs,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.storage_key, "infinite-library-save");
        assert_eq!(config.autosave_interval_ms, 30_000);
        assert_eq!(config.max_frame_delta_secs, 1.0);
    }

    #[test]
    fn partial_override() {
        let config = EngineConfig::from_json(r#"{"autosave_interval_ms": 5000}"#).unwrap();
        assert_eq!(config.autosave_interval_ms, 5_000);
        assert_eq!(config.max_offline_secs, 86_400.0);
    }

    #[test]
    fn rejects_zero_interval() {
        let err = EngineConfig::from_json(r#"{"autosave_interval_ms": 0}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NotPositive {
                field: "autosave_interval_ms",
                ..
            }
        ));
    }

    #[test]
    fn rejects_negative_delta() {
        let err = EngineConfig::from_json(r#"{"max_frame_delta_secs": -1.0}"#).unwrap_err();
        assert!(err.to_string().contains("max_frame_delta_secs"));
    }

    #[test]
    fn rejects_empty_key_and_bad_json() {
        assert!(matches!(
            EngineConfig::from_json(r#"{"storage_key": ""}"#),
            Err(ConfigError::EmptyStorageKey)
        ));
        assert!(matches!(
            EngineConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
