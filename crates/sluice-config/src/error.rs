//! Errors raised while assembling a [`SluiceConfig`](crate::SluiceConfig).

use std::path::PathBuf;
use thiserror::Error;

/// A layer of the configuration could not be applied.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required config file does not exist.
    #[error("no sluice config at {path}")]
    MissingFile {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// A config file exists but reading it failed.
    #[error("cannot read sluice config at {path}")]
    Unreadable {
        /// Path of the file.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The TOML layer did not match the `[boundary]`/`[logging]` schema.
    #[error("bad TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// The JSON layer did not match the `boundary`/`logging` schema.
    #[error("bad JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// Only `toml` and `json` sources are understood.
    #[error("config format `{0}` is not supported, use toml or json")]
    UnsupportedFormat(String),

    /// A loaded value failed validation.
    #[error("{key} rejected: {reason}")]
    InvalidValue {
        /// Dotted key, e.g. `boundary.default_status`.
        key: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A `PREFIX__SECTION__KEY` override could not be applied.
    #[error("environment override {name} rejected: {reason}")]
    EnvOverride {
        /// Variable name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The `.env` file exists but is malformed.
    #[error(".env layer failed: {0}")]
    Dotenv(#[from] dotenvy::Error),
}

impl ConfigError {
    pub(crate) fn missing_file(path: impl Into<PathBuf>) -> Self {
        Self::MissingFile { path: path.into() }
    }

    pub(crate) fn unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Unreadable {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_value(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn env_override(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnvOverride {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_source() {
        let err = ConfigError::missing_file("/etc/sluice/sluice.toml");
        assert_eq!(err.to_string(), "no sluice config at /etc/sluice/sluice.toml");

        let err = ConfigError::invalid_value("boundary.default_status", "must be in 100..=999");
        assert_eq!(
            err.to_string(),
            "boundary.default_status rejected: must be in 100..=999"
        );

        let err = ConfigError::env_override("SLUICE__BOUNDARY__DEFAULT_STATUS", "expected integer");
        assert_eq!(
            err.to_string(),
            "environment override SLUICE__BOUNDARY__DEFAULT_STATUS rejected: expected integer"
        );
    }

    #[test]
    fn test_unreadable_keeps_io_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ConfigError::unreadable("sluice.toml", io);
        assert!(std::error::Error::source(&err).is_some());
    }
}
