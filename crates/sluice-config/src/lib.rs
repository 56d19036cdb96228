//! Typed configuration for Sluice applications.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides (`SLUICE__BOUNDARY__DEFAULT_STATUS=404`)
//! - Strict parsing (unknown fields are errors)
//! - Validation before use
//!
//! # Example
//!
//! ```no_run
//! use sluice_config::ConfigLoader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new()
//!     .with_optional_file("sluice.toml")?
//!     .with_env_prefix("SLUICE")
//!     .load()?;
//!
//! sluice_telemetry::init_logging(&config.logging.to_log_config())?;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [boundary]
//! default_status = 200
//! script_name = "/api"
//! trust_forwarded_headers = false
//! default_content_type = "text/html; charset=utf-8"
//!
//! [logging]
//! enabled = true
//! level = "info,sluice_pipeline=debug"
//! format = "json"
//! include_location = false
//! ```

#![doc(html_root_url = "https://docs.rs/sluice-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::SluiceConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{BoundaryConfig, LogFormat, LoggingSection};
