//! Configuration section types.

use serde::{Deserialize, Serialize};
use sluice_core::EnvOptions;
use sluice_telemetry::LogConfig;

/// How requests become connections and connections become responses.
///
/// # Example
///
/// ```
/// use sluice_config::BoundaryConfig;
///
/// let config = BoundaryConfig {
///     script_name: "/api".to_string(),
///     ..Default::default()
/// };
/// assert_eq!(config.default_status, 200);
/// assert_eq!(config.env_options().script_name, "/api");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BoundaryConfig {
    /// Status rendered when no operation set one.
    #[serde(default = "default_status")]
    pub default_status: u16,

    /// Mount prefix stripped from the request path to form the path info.
    #[serde(default)]
    pub script_name: String,

    /// Honor `X-Forwarded-Proto`, `X-Forwarded-Host` and `X-Forwarded-For`.
    #[serde(default)]
    pub trust_forwarded_headers: bool,

    /// `Content-Type` added to responses that do not carry one.
    #[serde(default)]
    pub default_content_type: Option<String>,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            default_status: default_status(),
            script_name: String::new(),
            trust_forwarded_headers: false,
            default_content_type: None,
        }
    }
}

impl BoundaryConfig {
    /// Returns the options used to derive request facts.
    #[must_use]
    pub fn env_options(&self) -> EnvOptions {
        EnvOptions {
            script_name: self.script_name.clone(),
            trust_forwarded_headers: self.trust_forwarded_headers,
        }
    }
}

fn default_status() -> u16 {
    200
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON lines.
    #[default]
    Json,
    /// Human-readable, multi-line output.
    Pretty,
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directives (trace, debug, info, warn, error, or per target).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            include_location: false,
        }
    }
}

impl LoggingSection {
    /// Converts this section into a subscriber configuration.
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        let base = match self.format {
            LogFormat::Json => LogConfig::production(),
            LogFormat::Pretty => LogConfig::development(),
        };
        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            file_line_info: self.include_location,
            ..base
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_defaults() {
        let config = BoundaryConfig::default();
        assert_eq!(config.default_status, 200);
        assert!(config.script_name.is_empty());
        assert!(!config.trust_forwarded_headers);
        assert!(config.default_content_type.is_none());
    }

    #[test]
    fn test_boundary_partial_toml() {
        let config: BoundaryConfig = toml::from_str("trust_forwarded_headers = true").unwrap();
        assert!(config.trust_forwarded_headers);
        assert_eq!(config.default_status, 200);
    }

    #[test]
    fn test_boundary_rejects_unknown_fields() {
        assert!(toml::from_str::<BoundaryConfig>("mount = \"/api\"").is_err());
    }

    #[test]
    fn test_log_format_lowercase() {
        let section: LoggingSection = toml::from_str("format = \"pretty\"").unwrap();
        assert_eq!(section.format, LogFormat::Pretty);
    }

    #[test]
    fn test_to_log_config() {
        let section = LoggingSection {
            level: "debug".to_string(),
            format: LogFormat::Pretty,
            include_location: false,
            ..Default::default()
        };
        let config = section.to_log_config();
        assert_eq!(config.level, "debug");
        assert!(!config.json_format);
        assert!(!config.file_line_info);
    }
}
