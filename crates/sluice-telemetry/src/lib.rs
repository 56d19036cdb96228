//! # Sluice Telemetry
//!
//! Structured logging for services built on the Sluice pipeline engine.
//!
//! Sluice crates emit events with the `tracing` macros and never install a
//! subscriber themselves. Call [`init_logging`] once at startup to route
//! those events to stdout, as JSON in production or pretty-printed during
//! development.
//!
//! | Level   | Emitted by                                              |
//! |---------|---------------------------------------------------------|
//! | `error` | an application turning a pipeline error into a 500      |
//! | `warn`  | failed requests, injections naming no declared plug     |
//! | `info`  | completed requests (`RequestLogMiddleware`)             |
//! | `debug` | plug resolution, halts, request id assignment           |
//! | `trace` | every executed plug                                     |
//!
//! # Example
//!
//! ```rust,no_run
//! use sluice_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development()).expect("logging already initialized");
//! tracing::info!(service = "billing", "Starting");
//! ```

#![doc(html_root_url = "https://docs.rs/sluice-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, fields, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
