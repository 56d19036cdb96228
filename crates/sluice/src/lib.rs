//! # Sluice
//!
//! **A request pipeline engine**
//!
//! Sluice threads an immutable connection value through an ordered list of
//! named steps ("plugs"), stops as soon as a step halts the connection, and
//! renders whatever it ended up with into a response.
//!
//! - **Immutable connections** – every setter returns a new [`Conn`](sluice_core::Conn);
//!   halting is one-way and sticky
//! - **Plug resolution** – a plug is implemented inline, by a method of the
//!   pipeline owner, by a container entry, or by a whole nested pipeline
//! - **Injection** – any plug or middleware can be overridden by name when
//!   an application is built
//! - **Onion middleware** – transport-level middleware wraps the pipeline,
//!   first declared outermost
//!
//! ## Quick Start
//!
//! ```rust
//! use sluice::prelude::*;
//! use http::StatusCode;
//!
//! let app = PipelineBuilder::new()
//!     .middleware("request_id", MiddlewareSpec::middleware(RequestIdMiddleware::new()))
//!     .plug("status", PlugSpec::operation(|conn: Conn| Ok(conn.set_status(200))))
//!     .plug("body", PlugSpec::operation(|conn: Conn| Ok(conn.set_response_body("foo"))))
//!     .build()
//!     .unwrap();
//!
//! # tokio_test::block_on(async {
//! let request = http::Request::new(http_body_util::Full::new(bytes::Bytes::new()));
//! let response = app.respond(request).await;
//! assert_eq!(response.status(), StatusCode::OK);
//! # });
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Request → middleware… → build_conn → plug → plug → … → render_response
//!                                       (halt skips the rest)   ↓
//! Response ← middleware… ←─────────────────────────────────────┘
//! ```

#![doc(html_root_url = "https://docs.rs/sluice/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;
pub mod boundary;
mod builder;
pub mod ext;

pub use app::App;
pub use builder::{Injections, MiddlewareSpec, PipelineBuilder};

// Re-export pipeline types used when declaring applications
pub use sluice_pipeline::{MethodTable, Owner, Pipeline, Plug, PlugSpec};

// Re-export core types
pub use sluice_core as core;

// Re-export pipeline internals
pub use sluice_pipeline as pipeline;

// Re-export middleware types
pub use sluice_middleware as middleware;

// Re-export configuration
pub use sluice_config as config;

// Re-export logging setup
pub use sluice_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use sluice::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{ext, App, Injections, MiddlewareSpec, PipelineBuilder};

    pub use sluice_core::container::{Container, Registry};
    pub use sluice_core::{Conn, ConnState, Operation, PipelineError, PipelineResult, Session};

    pub use sluice_pipeline::{MethodTable, Owner, Pipeline, Plug, PlugSpec};

    pub use sluice_middleware::{
        BoxFuture, FnMiddleware, HandlerResult, Middleware, Next, Request, RequestHandler,
        RequestIdMiddleware, RequestLogMiddleware, Response, ResponseExt,
    };

    pub use sluice_config::{BoundaryConfig, ConfigLoader, SluiceConfig};
    pub use sluice_telemetry::{init_logging, LogConfig};
}
