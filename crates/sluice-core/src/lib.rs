//! # Sluice Core
//!
//! Core types for the Sluice request pipeline engine.
//!
//! - [`Conn`] - Immutable request/response value threaded through a pipeline
//! - [`ConnState`] - `Ongoing` or `Halted`; halting is one-way
//! - [`Env`] - Read-only request facts derived from the transport request
//! - [`Headers`](headers::Headers) - Header map keyed by normalized names
//! - [`Bag`](bag::Bag) - Copy-on-write storage shared between plugs
//! - [`Operation`] - A function from `Conn` to `Conn`
//! - [`Container`](container::Container) - Lookup contract used to resolve plugs
//! - [`PipelineError`] - Errors that escape a pipeline call

#![doc(html_root_url = "https://docs.rs/sluice-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod bag;
mod conn;
pub mod container;
mod env;
mod error;
pub mod headers;
mod operation;
pub mod session;

pub use conn::{Body, Conn, ConnState, ResponseParts};
pub use env::{Env, EnvOptions, RemoteAddr};
pub use error::{PipelineError, PipelineResult};
pub use operation::{Operation, OperationFn};
pub use session::Session;
