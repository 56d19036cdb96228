//! Core middleware trait and types.
//!
//! Middleware works strictly at the transport boundary: it sees a
//! [`Request`] on the way in and a [`Response`](crate::Response) on the way out, and knows
//! nothing about the connection value threaded through the pipeline inside.
//!
//! # Example
//!
//! ```
//! use sluice_middleware::{BoxFuture, HandlerResult, Middleware, Next, Request};
//!
//! struct PoweredBy;
//!
//! impl Middleware for PoweredBy {
//!     fn name(&self) -> &'static str {
//!         "powered_by"
//!     }
//!
//!     fn process<'a>(&'a self, request: Request, next: Next<'a>) -> BoxFuture<'a, HandlerResult> {
//!         Box::pin(async move {
//!             let mut response = next.run(request).await?;
//!             response
//!                 .headers_mut()
//!                 .insert("x-powered-by", http::HeaderValue::from_static("sluice"));
//!             Ok(response)
//!         })
//!     }
//! }
//! ```

use crate::handler::RequestHandler;
use crate::types::{BoxFuture, HandlerResult, Request};

/// The core middleware trait.
///
/// Middleware receives the incoming request and a [`Next`] callback to
/// invoke the rest of the stack.
///
/// # Invariants
///
/// - Middleware calls `next.run()` at most once; not calling it
///   short-circuits the stack with a response of its own
/// - Middleware SHOULD NOT swallow errors from downstream
pub trait Middleware: Send + Sync + 'static {
    /// Returns the name of this middleware.
    ///
    /// This name is used for logging and debugging.
    fn name(&self) -> &'static str;

    /// Process the request through this middleware.
    fn process<'a>(&'a self, request: Request, next: Next<'a>) -> BoxFuture<'a, HandlerResult>;
}

/// Callback to invoke the next middleware in the chain.
///
/// Consumed by [`Next::run`], so it can be called at most once.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    /// More middleware to process
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    /// End of chain
    Handler(&'a dyn RequestHandler),
}

impl<'a> Next<'a> {
    /// Creates a `Next` that will invoke `middleware`, then `next`.
    pub(crate) fn new(middleware: &'a dyn Middleware, next: Self) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Creates a terminal `Next` that invokes the handler.
    pub fn handler(handler: &'a dyn RequestHandler) -> Self {
        Self {
            inner: NextInner::Handler(handler),
        }
    }

    /// Invokes the next middleware or the handler.
    pub async fn run(self, request: Request) -> HandlerResult {
        match self.inner {
            NextInner::Chain { middleware, next } => middleware.process(request, *next).await,
            NextInner::Handler(handler) => handler.handle(request).await,
        }
    }
}

impl std::fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            NextInner::Chain { middleware, .. } => {
                f.debug_struct("Next").field("middleware", &middleware.name()).finish()
            }
            NextInner::Handler(_) => f
                .debug_struct("Next")
                .field("middleware", &"<handler>")
                .finish(),
        }
    }
}

/// A middleware that can be created from a function.
///
/// The function returns a boxed future borrowing the [`Next`] it was given.
///
/// # Example
///
/// ```
/// use sluice_middleware::FnMiddleware;
/// use std::time::Instant;
///
/// let timing = FnMiddleware::new("timing", |request, next| {
///     Box::pin(async move {
///         let start = Instant::now();
///         let response = next.run(request).await;
///         tracing::debug!(elapsed = ?start.elapsed(), "request finished");
///         response
///     })
/// });
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F>
where
    F: for<'a> Fn(Request, Next<'a>) -> BoxFuture<'a, HandlerResult> + Send + Sync + 'static,
{
    /// Creates a new function-based middleware.
    pub fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(Request, Next<'a>) -> BoxFuture<'a, HandlerResult> + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process<'a>(&'a self, request: Request, next: Next<'a>) -> BoxFuture<'a, HandlerResult> {
        (self.func)(request, next)
    }
}

impl<F> std::fmt::Debug for FnMiddleware<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnMiddleware").field("name", &self.name).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::FnHandler;
    use crate::types::{Response, ResponseExt};
    use bytes::Bytes;
    use http::{HeaderValue, StatusCode};
    use http_body_util::Full;

    struct TagMiddleware {
        name: &'static str,
    }

    impl Middleware for TagMiddleware {
        fn name(&self) -> &'static str {
            self.name
        }

        fn process<'a>(&'a self, request: Request, next: Next<'a>) -> BoxFuture<'a, HandlerResult> {
            Box::pin(async move {
                let mut response = next.run(request).await?;
                response
                    .headers_mut()
                    .append("x-visited", HeaderValue::from_static(self.name));
                Ok(response)
            })
        }
    }

    fn request() -> Request {
        http::Request::builder()
            .uri("/test")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn ok_handler() -> FnHandler<impl Fn(Request) -> std::future::Ready<HandlerResult>> {
        FnHandler::new(|_request| std::future::ready(Ok(Response::error(StatusCode::OK, "OK"))))
    }

    #[test]
    fn test_middleware_name() {
        let mw = TagMiddleware { name: "test" };
        assert_eq!(mw.name(), "test");
    }

    #[tokio::test]
    async fn test_next_handler() {
        let handler = ok_handler();
        let response = Next::handler(&handler).run(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_middleware_chain() {
        let mw1 = TagMiddleware { name: "first" };
        let mw2 = TagMiddleware { name: "second" };
        let handler = ok_handler();

        let next = Next::new(&mw1, Next::new(&mw2, Next::handler(&handler)));
        let response = next.run(request()).await.unwrap();

        let visited: Vec<_> = response
            .headers()
            .get_all("x-visited")
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        // Innermost middleware post-processes first.
        assert_eq!(visited, ["second", "first"]);
    }

    #[tokio::test]
    async fn test_fn_middleware_short_circuit() {
        let deny = FnMiddleware::new("deny", |_request, _next| {
            Box::pin(async {
                Ok::<_, sluice_core::PipelineError>(Response::error(
                    StatusCode::FORBIDDEN,
                    "Forbidden",
                ))
            })
        });
        let handler = ok_handler();

        let response = deny
            .process(request(), Next::handler(&handler))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
