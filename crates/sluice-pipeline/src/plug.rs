//! Declarative pipeline steps.
//!
//! A [`Plug`] names a step and says where its implementation comes from. It is
//! not runnable by itself; the [`Resolver`](crate::Resolver) turns it into an
//! [`Operation`] when a pipeline is built.

use crate::pipeline::Pipeline;
use sluice_core::{Conn, Operation, PipelineResult};

/// Where a plug's implementation comes from.
#[derive(Debug, Clone)]
pub enum PlugSpec {
    /// An inline operation, used as is.
    Operation(Operation),
    /// A key looked up in the container.
    Container(String),
    /// A method of the pipeline owner with the same name as the plug.
    OwnerMethod,
    /// A nested pipeline, run as a single step.
    Pipeline(Pipeline),
}

impl PlugSpec {
    /// Creates an inline operation spec from a fallible function.
    pub fn operation<F>(func: F) -> Self
    where
        F: Fn(Conn) -> PipelineResult<Conn> + Send + Sync + 'static,
    {
        Self::Operation(Operation::new(func))
    }

    /// Creates a container key spec.
    pub fn key(key: impl Into<String>) -> Self {
        Self::Container(key.into())
    }

    /// Creates an owner method spec.
    #[must_use]
    pub const fn method() -> Self {
        Self::OwnerMethod
    }

    /// Short description used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Operation(_) => "operation",
            Self::Container(_) => "container",
            Self::OwnerMethod => "owner_method",
            Self::Pipeline(_) => "pipeline",
        }
    }
}

impl From<Operation> for PlugSpec {
    fn from(operation: Operation) -> Self {
        Self::Operation(operation)
    }
}

impl From<Pipeline> for PlugSpec {
    fn from(pipeline: Pipeline) -> Self {
        Self::Pipeline(pipeline)
    }
}

/// A named, not yet resolved pipeline step.
#[derive(Debug, Clone)]
pub struct Plug {
    name: String,
    spec: PlugSpec,
}

impl Plug {
    /// Creates a plug.
    pub fn new(name: impl Into<String>, spec: impl Into<PlugSpec>) -> Self {
        Self {
            name: name.into(),
            spec: spec.into(),
        }
    }

    /// Creates a plug implemented by the owner method of the same name.
    pub fn method(name: impl Into<String>) -> Self {
        Self::new(name, PlugSpec::OwnerMethod)
    }

    /// Returns the plug name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared spec.
    #[must_use]
    pub fn spec(&self) -> &PlugSpec {
        &self.spec
    }

    /// Returns the same plug with its spec replaced.
    #[must_use]
    pub fn with_spec(self, spec: PlugSpec) -> Self {
        Self {
            name: self.name,
            spec,
        }
    }
}
