//! Onion composition of middleware around a handler.
//!
//! The middleware declared first sees the request first and the response
//! last. The innermost handler is usually a pipeline application.

use crate::handler::RequestHandler;
use crate::middleware::{Middleware, Next};
use crate::types::{BoxFuture, HandlerResult, Request};
use std::fmt;
use std::sync::Arc;

/// A type-erased middleware that can be stored in a vector.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// A handler wrapped in an ordered list of middleware.
///
/// The stack is immutable once built and can serve concurrent requests.
#[derive(Clone)]
pub struct MiddlewareStack {
    middlewares: Arc<[BoxedMiddleware]>,
    handler: Arc<dyn RequestHandler>,
}

/// Wraps `handler` in `middlewares`, first declared outermost.
///
/// # Example
///
/// ```
/// use sluice_middleware::{wrap, FnHandler, RequestIdMiddleware, Response, ResponseExt};
/// use http::StatusCode;
/// use std::sync::Arc;
///
/// let handler = FnHandler::new(|_request| async {
///     Ok(Response::error(StatusCode::OK, "OK"))
/// });
/// let stack = wrap(vec![Arc::new(RequestIdMiddleware::new())], Arc::new(handler));
/// assert_eq!(stack.middleware_names(), ["request_id"]);
/// ```
pub fn wrap(
    middlewares: Vec<BoxedMiddleware>,
    handler: Arc<dyn RequestHandler>,
) -> MiddlewareStack {
    MiddlewareStack {
        middlewares: middlewares.into(),
        handler,
    }
}

impl MiddlewareStack {
    /// Processes a request through every middleware, then the handler.
    pub async fn process(&self, request: Request) -> HandlerResult {
        self.build_chain().run(request).await
    }

    /// Builds the middleware chain for a request.
    fn build_chain(&self) -> Next<'_> {
        let mut next = Next::handler(self.handler.as_ref());
        for middleware in self.middlewares.iter().rev() {
            next = Next::new(middleware.as_ref(), next);
        }
        next
    }

    /// Returns the names of all middleware, outermost first.
    #[must_use]
    pub fn middleware_names(&self) -> Vec<&'static str> {
        self.middlewares.iter().map(|mw| mw.name()).collect()
    }

    /// Returns the number of middleware in the stack.
    #[must_use]
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    /// Returns `true` if the handler is not wrapped at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}

impl RequestHandler for MiddlewareStack {
    fn handle(&self, request: Request) -> BoxFuture<'_, HandlerResult> {
        Box::pin(self.process(request))
    }
}

impl fmt::Debug for MiddlewareStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareStack")
            .field("middlewares", &self.middleware_names())
            .finish_non_exhaustive()
    }
}
