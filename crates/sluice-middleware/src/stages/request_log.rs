//! Request logging middleware.
//!
//! Emits one structured log line per request once the response is known:
//!
//! - `service` - Service name given at construction
//! - `request_id` - Set when [`RequestIdMiddleware`] runs further out
//! - `method`, `path` - From the incoming request
//! - `status` - Response status code
//! - `duration_ms` - Time spent in the rest of the stack
//!
//! Requests that fail with a pipeline error are logged at `warn` level and
//! the error is passed on untouched.
//!
//! [`RequestIdMiddleware`]: super::RequestIdMiddleware

use super::request_id::RequestId;
use crate::middleware::{Middleware, Next};
use crate::types::{BoxFuture, HandlerResult, Request};
use std::time::Instant;
use tracing::{info, warn};

/// Middleware that logs every completed request.
///
/// # Example
///
/// ```
/// use sluice_middleware::RequestLogMiddleware;
///
/// let log = RequestLogMiddleware::new("billing");
/// assert_eq!(log.service_name(), "billing");
/// ```
#[derive(Debug, Clone)]
pub struct RequestLogMiddleware {
    service_name: String,
}

impl RequestLogMiddleware {
    /// Creates a request log middleware for the given service.
    #[must_use]
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    /// Returns the service name.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

impl Default for RequestLogMiddleware {
    fn default() -> Self {
        Self::new("sluice")
    }
}

impl Middleware for RequestLogMiddleware {
    fn name(&self) -> &'static str {
        "request_log"
    }

    fn process<'a>(&'a self, request: Request, next: Next<'a>) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let start = Instant::now();

            let method = request.method().to_string();
            let path = request.uri().path().to_string();
            let request_id = request
                .extensions()
                .get::<RequestId>()
                .map(ToString::to_string)
                .unwrap_or_default();

            let result = next.run(request).await;
            let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

            match &result {
                Ok(response) => info!(
                    service = %self.service_name,
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    status = response.status().as_u16(),
                    duration_ms,
                    "Request completed"
                ),
                Err(err) => warn!(
                    service = %self.service_name,
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    error_code = err.code(),
                    duration_ms,
                    "Request failed"
                ),
            }

            result
        })
    }
}
