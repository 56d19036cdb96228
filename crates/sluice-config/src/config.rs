//! Top-level configuration type.

use serde::{Deserialize, Serialize};

use crate::{BoundaryConfig, ConfigError, LogFormat, LoggingSection};

/// Complete Sluice configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct SluiceConfig {
    /// Request/response boundary settings.
    #[serde(default)]
    pub boundary: BoundaryConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingSection,
}

impl SluiceConfig {
    /// Development preset: pretty `debug` logs with call sites.
    #[must_use]
    pub fn development() -> Self {
        Self {
            boundary: BoundaryConfig::default(),
            logging: LoggingSection {
                level: "debug".to_string(),
                format: LogFormat::Pretty,
                include_location: true,
                ..LoggingSection::default()
            },
        }
    }

    /// Production preset: JSON `info` logs.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if:
    /// - `boundary.default_status` is outside `100..=999`
    /// - `boundary.script_name` is neither empty nor starts with `/`
    /// - `boundary.default_content_type` is empty
    /// - `logging.level` is not a valid filter
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(100..=999).contains(&self.boundary.default_status) {
            return Err(ConfigError::invalid_value(
                "boundary.default_status",
                format!("{} is not in 100..=999", self.boundary.default_status),
            ));
        }

        let script_name = &self.boundary.script_name;
        if !script_name.is_empty() && !script_name.starts_with('/') {
            return Err(ConfigError::invalid_value(
                "boundary.script_name",
                format!("{script_name:?} must be empty or start with '/'"),
            ));
        }

        if matches!(&self.boundary.default_content_type, Some(ct) if ct.trim().is_empty()) {
            return Err(ConfigError::invalid_value(
                "boundary.default_content_type",
                "must not be empty when set",
            ));
        }

        if self.logging.enabled {
            sluice_telemetry::create_env_filter(&self.logging.level)
                .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SluiceConfig::default().validate().is_ok());
        assert!(SluiceConfig::development().validate().is_ok());
    }

    #[test]
    fn test_invalid_status() {
        let mut config = SluiceConfig::default();
        config.boundary.default_status = 42;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("boundary.default_status"));
    }

    #[test]
    fn test_invalid_script_name() {
        let mut config = SluiceConfig::default();
        config.boundary.script_name = "api".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { key, .. }) if key == "boundary.script_name"
        ));
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = SluiceConfig::default();
        config.logging.level = "sluice=shouting".to_string();
        assert!(config.validate().is_err());

        config.logging.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_unknown_section() {
        let result: Result<SluiceConfig, _> = toml::from_str("[server]\nport = 8080\n");
        assert!(result.is_err());
    }
}
