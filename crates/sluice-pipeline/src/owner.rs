//! The object hosting a pipeline.
//!
//! Plugs declared without an implementation run a method of the owner with
//! the plug's name. The binding is late: resolution only checks that the
//! owner [responds to](Owner::responds_to) the name, and every invocation goes
//! back through [`Owner::call_method`], so the owner decides at call time
//! what actually runs.

use sluice_core::{Conn, Operation, PipelineError, PipelineResult};
use std::collections::HashMap;
use std::fmt;

/// An object exposing named operations.
///
/// # Example
///
/// ```
/// use sluice_core::{Conn, PipelineError, PipelineResult};
/// use sluice_pipeline::Owner;
///
/// struct Greeter {
///     greeting: String,
/// }
///
/// impl Owner for Greeter {
///     fn responds_to(&self, name: &str) -> bool {
///         name == "hello"
///     }
///
///     fn call_method(&self, name: &str, conn: Conn) -> PipelineResult<Conn> {
///         match name {
///             "hello" => Ok(conn.set_response_body(self.greeting.clone())),
///             other => Err(PipelineError::invalid_plug(other, "no such method")),
///         }
///     }
/// }
/// ```
pub trait Owner: Send + Sync + 'static {
    /// Returns `true` if the owner has a method called `name`.
    fn responds_to(&self, name: &str) -> bool;

    /// Invokes the method called `name`.
    fn call_method(&self, name: &str, conn: Conn) -> PipelineResult<Conn>;
}

/// An [`Owner`] backed by a table of named operations.
#[derive(Clone, Default)]
pub struct MethodTable {
    methods: HashMap<String, Operation>,
}

impl MethodTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a method.
    #[must_use]
    pub fn method<F>(mut self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(Conn) -> PipelineResult<Conn> + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Operation::new(func));
        self
    }

    /// Returns the method names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }
}

impl Owner for MethodTable {
    fn responds_to(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    fn call_method(&self, name: &str, conn: Conn) -> PipelineResult<Conn> {
        let method = self
            .methods
            .get(name)
            .ok_or_else(|| PipelineError::invalid_plug(name, "owner has no such method"))?;
        method.call(conn)
    }
}

impl fmt::Debug for MethodTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("MethodTable").field("methods", &names).finish()
    }
}
