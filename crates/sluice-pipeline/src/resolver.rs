//! Plug resolution.
//!
//! The resolver turns declarative [`Plug`]s into runnable [`Step`]s. For
//! each plug it picks an implementation in this order:
//!
//! 1. An injected spec for the plug's name, if one was given.
//! 2. The declared spec:
//!    - an inline operation is used directly;
//!    - a nested pipeline is expanded in place, its steps keeping their
//!      names and order;
//!    - an owner method plug binds to the owner's method of the same name;
//!    - a container key is looked up and must hold an [`Operation`] or a
//!      [`Pipeline`].
//!
//! Anything else is an [`InvalidPlug`](PipelineError::InvalidPlug) error.
//! Resolution happens once, when a pipeline is built, so a misconfigured
//! plug fails before the first request is served.

use crate::compose::Step;
use crate::owner::Owner;
use crate::pipeline::Pipeline;
use crate::plug::{Plug, PlugSpec};
use sluice_core::container::{Container, EmptyContainer};
use sluice_core::{Operation, PipelineError, PipelineResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Per-instance plug overrides, keyed by plug name.
pub type Injections = HashMap<String, PlugSpec>;

/// Resolves plugs against a container and an optional owner.
#[derive(Clone)]
pub struct Resolver {
    container: Arc<dyn Container>,
    owner: Option<Arc<dyn Owner>>,
}

impl Resolver {
    /// Creates a resolver with an empty container and no owner.
    #[must_use]
    pub fn new() -> Self {
        Self {
            container: Arc::new(EmptyContainer),
            owner: None,
        }
    }

    /// Sets the container used for key lookups.
    #[must_use]
    pub fn with_container(mut self, container: Arc<dyn Container>) -> Self {
        self.container = container;
        self
    }

    /// Sets the owner used for method plugs.
    #[must_use]
    pub fn with_owner(mut self, owner: Arc<dyn Owner>) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Resolves a single plug spec into the steps it contributes.
    ///
    /// Operations, owner methods and container operations contribute one
    /// step. Pipelines contribute all of their steps.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidPlug`] if no implementation can be
    /// derived.
    pub fn resolve(&self, name: &str, spec: &PlugSpec) -> PipelineResult<Vec<Step>> {
        match spec {
            PlugSpec::Operation(operation) => Ok(vec![Step::new(name, operation.clone())]),
            PlugSpec::Pipeline(pipeline) => Ok(pipeline.steps().to_vec()),
            PlugSpec::OwnerMethod => self
                .resolve_method(name)
                .map(|operation| vec![Step::new(name, operation)]),
            PlugSpec::Container(key) => self.resolve_key(name, key),
        }
    }

    /// Resolves a plug, honoring an injected override for its name.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidPlug`] if no implementation can be
    /// derived.
    pub fn resolve_plug(&self, plug: &Plug, injections: &Injections) -> PipelineResult<Vec<Step>> {
        let spec = match injections.get(plug.name()) {
            Some(injected) => {
                debug!(plug = plug.name(), kind = injected.kind(), "Using injected plug");
                injected
            }
            None => plug.spec(),
        };
        self.resolve(plug.name(), spec)
    }

    /// Resolves every plug, in order, into a frozen [`Pipeline`].
    ///
    /// Injections naming no declared plug are ignored with a warning.
    ///
    /// # Errors
    ///
    /// Returns the first resolution error.
    pub fn resolve_all(&self, plugs: &[Plug], injections: &Injections) -> PipelineResult<Pipeline> {
        for name in injections.keys() {
            if !plugs.iter().any(|plug| plug.name() == name) {
                warn!(plug = %name, "Injection does not match any declared plug");
            }
        }

        let mut steps = Vec::with_capacity(plugs.len());
        for plug in plugs {
            steps.extend(self.resolve_plug(plug, injections)?);
        }
        Ok(Pipeline::new(steps))
    }

    fn resolve_method(&self, name: &str) -> PipelineResult<Operation> {
        let owner = self
            .owner
            .as_ref()
            .ok_or_else(|| PipelineError::invalid_plug(name, "pipeline has no owner"))?;

        if !owner.responds_to(name) {
            return Err(PipelineError::invalid_plug(
                name,
                "owner does not respond to a method of that name",
            ));
        }

        let owner = Arc::clone(owner);
        let method = name.to_string();
        Ok(Operation::new(move |conn| owner.call_method(&method, conn)))
    }

    fn resolve_key(&self, name: &str, key: &str) -> PipelineResult<Vec<Step>> {
        let value = self.container.lookup(key).ok_or_else(|| {
            PipelineError::invalid_plug(name, format!("container has no entry for key {key}"))
        })?;

        if let Some(operation) = value.downcast_ref::<Operation>() {
            return Ok(vec![Step::new(name, operation.clone())]);
        }
        if let Some(pipeline) = value.downcast_ref::<Pipeline>() {
            return Ok(pipeline.steps().to_vec());
        }

        Err(PipelineError::invalid_plug(
            name,
            format!("container entry {key} is not an operation or a pipeline"),
        ))
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("has_owner", &self.owner.is_some())
            .finish_non_exhaustive()
    }
}
