//! Request ID middleware.
//!
//! Every request gets an identifier used to correlate log lines. The ID is:
//!
//! 1. Taken from the `X-Request-Id` header, when the middleware trusts
//!    incoming IDs and the header holds a valid UUID
//! 2. Otherwise a freshly generated UUID v7 (time-ordered)
//!
//! The ID is inserted into the request extensions, where the pipeline's
//! connection can read it, and echoed on the response.

use crate::middleware::{Middleware, Next};
use crate::types::{BoxFuture, HandlerResult, Request};
use http::HeaderValue;
use std::fmt;
use tracing::debug;
use uuid::Uuid;

/// The header name for request ID propagation.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// A request identifier, stored in the request extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generates a new time-ordered ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wraps an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Middleware that generates or propagates request IDs.
///
/// # Example
///
/// ```
/// use sluice_middleware::RequestIdMiddleware;
///
/// // Edge service: always generate.
/// let edge = RequestIdMiddleware::new();
/// // Internal service: keep the caller's ID.
/// let internal = RequestIdMiddleware::trust_incoming();
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestIdMiddleware {
    trust_incoming: bool,
}

impl RequestIdMiddleware {
    /// Creates a middleware that always generates new IDs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a middleware that keeps valid incoming `X-Request-Id` headers.
    #[must_use]
    pub fn trust_incoming() -> Self {
        Self {
            trust_incoming: true,
        }
    }

    fn extract_request_id(&self, request: &Request) -> Option<RequestId> {
        if !self.trust_incoming {
            return None;
        }

        request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .map(RequestId::from_uuid)
    }
}

impl Middleware for RequestIdMiddleware {
    fn name(&self) -> &'static str {
        "request_id"
    }

    fn process<'a>(&'a self, mut request: Request, next: Next<'a>) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let request_id = self
                .extract_request_id(&request)
                .unwrap_or_else(RequestId::new);
            debug!(request_id = %request_id, "Assigned request id");

            request.extensions_mut().insert(request_id);

            let mut response = next.run(request).await?;

            if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
                response.headers_mut().insert(REQUEST_ID_HEADER, value);
            }

            Ok(response)
        })
    }
}
