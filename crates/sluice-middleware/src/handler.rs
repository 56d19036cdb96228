//! The innermost application of a middleware stack.

use crate::types::{BoxFuture, HandlerResult, Request};
use std::future::Future;
use std::sync::Arc;

/// Anything that turns a transport request into a transport response.
///
/// A built pipeline application implements this, and so does a
/// [`MiddlewareStack`](crate::MiddlewareStack), so stacks nest.
pub trait RequestHandler: Send + Sync + 'static {
    /// Handles a request.
    fn handle(&self, request: Request) -> BoxFuture<'_, HandlerResult>;
}

impl<H: RequestHandler + ?Sized> RequestHandler for Arc<H> {
    fn handle(&self, request: Request) -> BoxFuture<'_, HandlerResult> {
        (**self).handle(request)
    }
}

/// A [`RequestHandler`] created from an async function.
///
/// # Example
///
/// ```
/// use sluice_middleware::{FnHandler, Response, ResponseExt};
/// use http::StatusCode;
///
/// let handler = FnHandler::new(|_request| async {
///     Ok(Response::error(StatusCode::NOT_FOUND, "Not Found"))
/// });
/// ```
pub struct FnHandler<F> {
    func: F,
}

impl<F, Fut> FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    /// Creates a new function-based handler.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F, Fut> RequestHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn handle(&self, request: Request) -> BoxFuture<'_, HandlerResult> {
        Box::pin((self.func)(request))
    }
}

impl<F> std::fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Response, ResponseExt};
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::Full;

    #[tokio::test]
    async fn test_fn_handler() {
        let handler = FnHandler::new(|request: Request| async move {
            let status = if request.uri().path() == "/" {
                StatusCode::OK
            } else {
                StatusCode::NOT_FOUND
            };
            Ok(Response::error(status, "done"))
        });

        let request = http::Request::builder()
            .uri("/missing")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let response = handler.handle(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
