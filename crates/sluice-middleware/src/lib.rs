//! # Sluice Middleware
//!
//! Transport-level middleware for the Sluice pipeline engine.
//!
//! A pipeline application turns a [`Request`] into a [`Response`]. This crate
//! wraps such an application in an onion of [`Middleware`]: the first
//! middleware declared sees the request first and the response last.
//!
//! ```text
//! Request → RequestId → RequestLog → … → pipeline app
//!                                              ↓
//! Response ← RequestId ← RequestLog ← … ←──────┘
//! ```
//!
//! Middleware never sees the pipeline's connection value. It works on
//! `http` requests and responses and can short-circuit by answering without
//! calling [`Next::run`].

#![doc(html_root_url = "https://docs.rs/sluice-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod handler;
pub mod middleware;
pub mod stack;
pub mod stages;
pub mod types;

pub use handler::{FnHandler, RequestHandler};
pub use middleware::{FnMiddleware, Middleware, Next};
pub use stack::{wrap, BoxedMiddleware, MiddlewareStack};
pub use stages::{RequestId, RequestIdMiddleware, RequestLogMiddleware, REQUEST_ID_HEADER};
pub use types::{BoxFuture, HandlerResult, Request, Response, ResponseExt};
