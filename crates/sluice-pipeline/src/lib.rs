//! # Sluice Pipeline
//!
//! Plug resolution and the composition engine.
//!
//! A pipeline is declared as an ordered list of [`Plug`]s. Each plug names a
//! step and says where its implementation lives: inline, in a
//! [`Container`](sluice_core::container::Container), on the pipeline
//! [`Owner`], or in another [`Pipeline`]. The [`Resolver`] turns the
//! declarations into a frozen [`Pipeline`], and [`compose::run`] threads a
//! [`Conn`](sluice_core::Conn) through it, stopping at the first step that
//! halts the connection.
//!
//! ## Example
//!
//! ```
//! use sluice_core::Conn;
//! use sluice_pipeline::{Injections, MethodTable, Plug, PlugSpec, Resolver};
//! use std::sync::Arc;
//!
//! let owner = MethodTable::new()
//!     .method("hello", |conn: Conn| Ok(conn.set_response_body("Hello, world!")));
//!
//! let plugs = vec![
//!     Plug::new("status", PlugSpec::operation(|conn: Conn| Ok(conn.set_status(200)))),
//!     Plug::method("hello"),
//! ];
//!
//! let pipeline = Resolver::new()
//!     .with_owner(Arc::new(owner))
//!     .resolve_all(&plugs, &Injections::new())
//!     .unwrap();
//!
//! let conn = pipeline.call(Conn::default()).unwrap();
//! assert_eq!(conn.status(), Some(200));
//! assert_eq!(conn.response_body(), ["Hello, world!"]);
//! ```

#![doc(html_root_url = "https://docs.rs/sluice-pipeline/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod compose;
mod owner;
mod pipeline;
mod plug;
mod resolver;

pub use compose::Step;
pub use owner::{MethodTable, Owner};
pub use pipeline::Pipeline;
pub use plug::{Plug, PlugSpec};
pub use resolver::{Injections, Resolver};
