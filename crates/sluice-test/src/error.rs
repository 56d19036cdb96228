//! Test error types.

use sluice_core::PipelineError;
use thiserror::Error;

/// Errors that can occur while driving an application under test.
#[derive(Debug, Error)]
pub enum TestError {
    /// The request could not be built.
    #[error("Request build error: {0}")]
    RequestBuild(String),

    /// A header name or value is invalid.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Reading the response body failed.
    #[error("Body read error: {0}")]
    BodyRead(String),

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The application returned a pipeline error instead of a response.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = TestError::InvalidHeader("x y".to_string());
        assert_eq!(err.to_string(), "Invalid header: x y");

        let err: TestError = PipelineError::key_not_found("user").into();
        assert!(err.to_string().starts_with("Pipeline error: key not found"));
    }
}
