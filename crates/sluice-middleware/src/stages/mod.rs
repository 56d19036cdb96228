//! Bundled middleware stages.
//!
//! Neither stage is installed by default; add them to a builder like any
//! other middleware.
//!
//! - [`request_id`] - Generate or propagate a request ID (UUID v7)
//! - [`request_log`] - Log method, path, status and duration per request

pub mod request_id;
pub mod request_log;

pub use request_id::{RequestId, RequestIdMiddleware, REQUEST_ID_HEADER};
pub use request_log::RequestLogMiddleware;
