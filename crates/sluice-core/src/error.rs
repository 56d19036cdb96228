//! Error types for Sluice.
//!
//! [`PipelineError`] is the single error type that flows out of a pipeline
//! call. None of its variants describe a business failure: an operation that
//! wants to stop early with a custom response halts the [`Conn`](crate::Conn)
//! instead of returning an error.
//!
//! | Variant                    | Raised by                              |
//! |----------------------------|----------------------------------------|
//! | `KeyNotFound`              | `Conn::fetch` / `Bag::fetch`           |
//! | `BagTypeMismatch`          | `Conn::fetch` / `Bag::fetch`           |
//! | `InvalidPlug`              | plug resolution                        |
//! | `InvalidOperationResult`   | the composition engine                 |
//! | `MissingMiddleware`        | helpers that need a middleware (session) |
//! | `MalformedParams`          | `Conn::params`                         |
//! | `InvalidResponse`          | rendering a `Conn` into a response     |
//! | `Internal`                 | operations wrapping I/O failures       |

use std::fmt;
use thiserror::Error;

/// Result type alias using [`PipelineError`].
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Standard error type for Sluice.
///
/// # Example
///
/// ```
/// use sluice_core::{Conn, PipelineError};
///
/// let conn = Conn::default();
/// let err = conn.fetch::<String>("missing").unwrap_err();
/// assert!(matches!(err, PipelineError::KeyNotFound { .. }));
/// ```
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A bag key was fetched without a default and is absent.
    #[error("key not found in bag: {key}")]
    KeyNotFound {
        /// The missing key.
        key: String,
    },

    /// A bag key holds a value of a different type than requested.
    #[error("bag key {key} does not hold a value of type {expected}")]
    BagTypeMismatch {
        /// The key that was fetched.
        key: String,
        /// Name of the requested type.
        expected: &'static str,
    },

    /// No operation could be derived from a plug.
    #[error(
        "plug {name} could not be resolved: {reason}. A plug must be given an operation, \
         name a method of the pipeline owner, or name a callable registered in the container"
    )]
    InvalidPlug {
        /// The plug name.
        name: String,
        /// What went wrong during resolution.
        reason: String,
    },

    /// An operation produced something that is not a connection.
    #[error("operation {plug} returned an invalid result: {returned}")]
    InvalidOperationResult {
        /// The plug whose operation misbehaved.
        plug: String,
        /// Diagnostic rendering of the offending value.
        returned: String,
    },

    /// A helper needs data that a middleware was expected to place in the env.
    #[error("missing middleware {middleware}: env key {key} is not set")]
    MissingMiddleware {
        /// The middleware that should have run.
        middleware: &'static str,
        /// The env key it populates.
        key: &'static str,
    },

    /// Request parameters could not be decoded.
    #[error("malformed request parameters: {0}")]
    MalformedParams(#[from] serde_urlencoded::de::Error),

    /// A connection could not be rendered into a transport response.
    #[error("invalid response: {message}")]
    InvalidResponse {
        /// Human-readable error message.
        message: String,
    },

    /// Internal failure inside an operation.
    #[error("internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        #[source]
        source: Option<anyhow::Error>,
    },
}

/// Placeholder plug name used before the engine knows which plug failed.
pub(crate) const UNKNOWN_PLUG: &str = "<unknown>";

impl PipelineError {
    /// Creates a key-not-found error.
    #[must_use]
    pub fn key_not_found(key: impl Into<String>) -> Self {
        Self::KeyNotFound { key: key.into() }
    }

    /// Creates an invalid-plug error.
    #[must_use]
    pub fn invalid_plug(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPlug {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid-result error carrying a rendering of `returned`.
    ///
    /// The plug name is filled in by the composition engine.
    #[must_use]
    pub fn invalid_result(returned: impl fmt::Debug) -> Self {
        Self::InvalidOperationResult {
            plug: UNKNOWN_PLUG.to_string(),
            returned: format!("{returned:?}"),
        }
    }

    /// Creates an invalid-response error.
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source.
    #[must_use]
    pub fn internal_with_source(message: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Attaches the failing plug name to an [`InvalidOperationResult`] that
    /// does not carry one yet. Other variants are returned unchanged.
    ///
    /// [`InvalidOperationResult`]: PipelineError::InvalidOperationResult
    #[must_use]
    pub fn with_plug(self, name: &str) -> Self {
        match self {
            Self::InvalidOperationResult { plug, returned } if plug == UNKNOWN_PLUG => {
                Self::InvalidOperationResult {
                    plug: name.to_string(),
                    returned,
                }
            }
            other => other,
        }
    }

    /// Returns the short machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::KeyNotFound { .. } => "KEY_NOT_FOUND",
            Self::BagTypeMismatch { .. } => "BAG_TYPE_MISMATCH",
            Self::InvalidPlug { .. } => "INVALID_PLUG",
            Self::InvalidOperationResult { .. } => "INVALID_OPERATION_RESULT",
            Self::MissingMiddleware { .. } => "MISSING_MIDDLEWARE",
            Self::MalformedParams(_) => "MALFORMED_PARAMS",
            Self::InvalidResponse { .. } => "INVALID_RESPONSE",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_not_found_display() {
        let err = PipelineError::key_not_found("user");
        assert_eq!(err.to_string(), "key not found in bag: user");
        assert_eq!(err.code(), "KEY_NOT_FOUND");
    }

    #[test]
    fn test_invalid_plug_mentions_alternatives() {
        let err = PipelineError::invalid_plug("hello", "owner has no method named hello");
        let message = err.to_string();
        assert!(message.contains("plug hello"));
        assert!(message.contains("method of the pipeline owner"));
        assert!(message.contains("container"));
    }

    #[test]
    fn test_with_plug_fills_unknown_name() {
        let err = PipelineError::invalid_result(42).with_plug("broken");
        match err {
            PipelineError::InvalidOperationResult { plug, returned } => {
                assert_eq!(plug, "broken");
                assert_eq!(returned, "42");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_with_plug_keeps_existing_name() {
        let err = PipelineError::invalid_result("x")
            .with_plug("inner")
            .with_plug("outer");
        assert!(matches!(
            err,
            PipelineError::InvalidOperationResult { ref plug, .. } if plug == "inner"
        ));
    }

    #[test]
    fn test_with_plug_ignores_other_variants() {
        let err = PipelineError::key_not_found("k").with_plug("p");
        assert!(matches!(err, PipelineError::KeyNotFound { .. }));
    }

    #[test]
    fn test_internal_with_source() {
        let err = PipelineError::internal_with_source("db down", anyhow::anyhow!("timeout"));
        assert_eq!(err.to_string(), "internal error: db down");
        assert!(std::error::Error::source(&err).is_some());
    }
}
