//! Built pipeline applications.

use crate::boundary::{build_conn, render_response};
use http::StatusCode;
use sluice_config::BoundaryConfig;
use sluice_core::{Operation, PipelineError};
use sluice_middleware::{
    wrap, BoxFuture, BoxedMiddleware, HandlerResult, MiddlewareStack, Request, RequestHandler,
    Response, ResponseExt,
};
use sluice_pipeline::Pipeline;
use std::fmt;
use std::sync::Arc;
use tracing::error;

/// A resolved middleware together with the name it was declared under.
#[derive(Clone)]
pub(crate) struct MiddlewareEntry {
    pub(crate) name: String,
    pub(crate) middleware: BoxedMiddleware,
}

/// A runnable pipeline application.
///
/// An `App` is the product of
/// [`PipelineBuilder::build`](crate::PipelineBuilder::build): a frozen
/// pipeline of resolved plugs, wrapped in its middleware stack. It holds no
/// per-request state and can serve concurrent requests; cloning is cheap.
///
/// Requests flow through the middleware onion, then through the transport
/// boundary into a [`Conn`](sluice_core::Conn), through the pipeline, and
/// back out:
///
/// ```text
/// Request → middleware… → build_conn → plugs… → render_response
///                                                      ↓
/// Response ← middleware… ←─────────────────────────────┘
/// ```
#[derive(Clone)]
pub struct App {
    pipeline: Pipeline,
    middlewares: Arc<[MiddlewareEntry]>,
    stack: MiddlewareStack,
}

impl App {
    pub(crate) fn new(
        pipeline: Pipeline,
        middlewares: Vec<MiddlewareEntry>,
        config: BoundaryConfig,
    ) -> Self {
        let inner = PipelineHandler {
            pipeline: pipeline.clone(),
            config,
        };
        let stack = wrap(
            middlewares.iter().map(|entry| Arc::clone(&entry.middleware)).collect(),
            Arc::new(inner),
        );

        Self {
            pipeline,
            middlewares: middlewares.into(),
            stack,
        }
    }

    /// Handles a request.
    ///
    /// Pipeline errors are returned untouched; deciding how to surface them
    /// is up to the caller. See [`App::respond`].
    ///
    /// # Errors
    ///
    /// Returns the first [`PipelineError`] raised by a plug, by rendering,
    /// or by a middleware.
    pub async fn call(&self, request: Request) -> HandlerResult {
        self.stack.process(request).await
    }

    /// Handles a request, turning a pipeline error into a `500` response.
    ///
    /// The error is logged and answered with the JSON error envelope
    /// `{"error": {"code": ..., "message": ...}}`.
    pub async fn respond(&self, request: Request) -> Response {
        match self.call(request).await {
            Ok(response) => response,
            Err(err) => {
                error!(error = %err, error_code = err.code(), "Pipeline failed");
                Response::json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    err.code(),
                    &err.to_string(),
                )
            }
        }
    }

    /// Returns the resolved pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Exposes the pipeline as a single operation, for plugging into
    /// another pipeline. Middleware is not part of the operation.
    #[must_use]
    pub fn to_operation(&self) -> Operation {
        self.pipeline.to_operation()
    }

    /// Returns the resolved plug names, in execution order.
    #[must_use]
    pub fn plug_names(&self) -> Vec<&str> {
        self.pipeline.names().collect()
    }

    /// Returns the resolved middleware names, outermost first.
    #[must_use]
    pub fn middleware_names(&self) -> Vec<&str> {
        self.middlewares.iter().map(|entry| entry.name.as_str()).collect()
    }

    pub(crate) fn middleware_entries(&self) -> &[MiddlewareEntry] {
        &self.middlewares
    }
}

impl RequestHandler for App {
    fn handle(&self, request: Request) -> BoxFuture<'_, HandlerResult> {
        Box::pin(self.call(request))
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("plugs", &self.plug_names())
            .field("middlewares", &self.middleware_names())
            .finish()
    }
}

/// The innermost handler: request to connection, pipeline, connection to
/// response.
struct PipelineHandler {
    pipeline: Pipeline,
    config: BoundaryConfig,
}

impl PipelineHandler {
    async fn run(&self, request: Request) -> Result<Response, PipelineError> {
        let conn = build_conn(request, &self.config).await;
        let conn = self.pipeline.call(conn)?;
        render_response(conn, &self.config)
    }
}

impl RequestHandler for PipelineHandler {
    fn handle(&self, request: Request) -> BoxFuture<'_, HandlerResult> {
        Box::pin(self.run(request))
    }
}
