//! Declaring and building applications.
//!
//! A [`PipelineBuilder`] accumulates plug and middleware declarations and
//! produces an [`App`] in one explicit [`build`](PipelineBuilder::build)
//! step. All plugs are resolved at build time, so an unresolvable plug is
//! reported before any request is served.
//!
//! Both lists support per-build overrides through [`Injections`], and both
//! expand nested applications in place: composing an app contributes its
//! middlewares to the middleware list and its plugs to the plug list.

use crate::app::{App, MiddlewareEntry};
use sluice_config::BoundaryConfig;
use sluice_core::container::{Container, EmptyContainer};
use sluice_core::PipelineResult;
use sluice_middleware::{BoxedMiddleware, Middleware};
use sluice_pipeline::{Owner, Plug, PlugSpec, Resolver};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Where a middleware declaration's implementation comes from.
#[derive(Clone)]
pub enum MiddlewareSpec {
    /// A single middleware.
    Middleware(BoxedMiddleware),
    /// Another application, expanding to all of its middlewares.
    App(App),
}

impl MiddlewareSpec {
    /// Creates a spec for a single middleware.
    pub fn middleware(middleware: impl Middleware) -> Self {
        Self::Middleware(Arc::new(middleware))
    }
}

impl From<App> for MiddlewareSpec {
    fn from(app: App) -> Self {
        Self::App(app)
    }
}

impl fmt::Debug for MiddlewareSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Middleware(middleware) => {
                f.debug_tuple("Middleware").field(&middleware.name()).finish()
            }
            Self::App(app) => f.debug_tuple("App").field(app).finish(),
        }
    }
}

/// Per-build overrides for plugs and middlewares, keyed by declared name.
///
/// Names that match no declaration are ignored with a warning.
///
/// # Example
///
/// ```
/// use sluice::{Injections, PlugSpec};
/// use sluice_core::Conn;
///
/// let injections = Injections::new()
///     .plug("greet", PlugSpec::operation(|conn: Conn| Ok(conn.set_response_body("Hi"))));
/// assert!(injections.has_plug("greet"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Injections {
    plugs: sluice_pipeline::Injections,
    middlewares: HashMap<String, MiddlewareSpec>,
}

impl Injections {
    /// Creates an empty set of overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the plug declared as `name`.
    pub fn plug(mut self, name: impl Into<String>, spec: impl Into<PlugSpec>) -> Self {
        self.plugs.insert(name.into(), spec.into());
        self
    }

    /// Overrides the middleware declared as `name`.
    pub fn middleware(mut self, name: impl Into<String>, spec: impl Into<MiddlewareSpec>) -> Self {
        self.middlewares.insert(name.into(), spec.into());
        self
    }

    /// Returns `true` if a plug override is registered for `name`.
    #[must_use]
    pub fn has_plug(&self, name: &str) -> bool {
        self.plugs.contains_key(name)
    }

    /// Returns `true` if a middleware override is registered for `name`.
    #[must_use]
    pub fn has_middleware(&self, name: &str) -> bool {
        self.middlewares.contains_key(name)
    }
}

#[derive(Debug, Clone)]
struct MiddlewareDecl {
    name: String,
    spec: MiddlewareSpec,
}

/// Builder for [`App`].
///
/// # Example
///
/// ```
/// use sluice::{MethodTable, PipelineBuilder, PlugSpec};
/// use sluice_core::container::Registry;
/// use sluice_core::{Conn, Operation};
///
/// let owner = MethodTable::new()
///     .method("hello", |conn: Conn| Ok(conn.set_response_body("Hello, world!")));
/// let registry = Registry::new()
///     .register_operation("plug.json", Operation::infallible(|conn: Conn| {
///         conn.add_response_header("Content-Type", "application/json")
///     }));
///
/// let app = PipelineBuilder::new()
///     .container(registry)
///     .owner(owner)
///     .plug("status", PlugSpec::operation(|conn: Conn| Ok(conn.set_status(200))))
///     .plug_method("hello")
///     .plug("json", PlugSpec::key("plug.json"))
///     .build()
///     .unwrap();
///
/// assert_eq!(app.plug_names(), ["status", "hello", "json"]);
/// ```
#[derive(Clone)]
pub struct PipelineBuilder {
    plugs: Vec<Plug>,
    middlewares: Vec<MiddlewareDecl>,
    container: Arc<dyn Container>,
    owner: Option<Arc<dyn Owner>>,
    config: BoundaryConfig,
}

impl PipelineBuilder {
    /// Creates a builder with no plugs, no middleware, an empty container
    /// and default boundary settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            plugs: Vec::new(),
            middlewares: Vec::new(),
            container: Arc::new(EmptyContainer),
            owner: None,
            config: BoundaryConfig::default(),
        }
    }

    /// Sets the container used to resolve key plugs.
    pub fn container(mut self, container: impl Container) -> Self {
        self.container = Arc::new(container);
        self
    }

    /// Sets the owner whose methods back method plugs.
    pub fn owner(mut self, owner: impl Owner) -> Self {
        self.owner = Some(Arc::new(owner));
        self
    }

    /// Sets an already shared owner.
    pub fn shared_owner(mut self, owner: Arc<dyn Owner>) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Sets the transport boundary settings.
    pub fn boundary(mut self, config: BoundaryConfig) -> Self {
        self.config = config;
        self
    }

    /// Declares a plug.
    pub fn plug(mut self, name: impl Into<String>, spec: impl Into<PlugSpec>) -> Self {
        self.plugs.push(Plug::new(name, spec));
        self
    }

    /// Declares a plug backed by the owner's method of the same name.
    pub fn plug_method(mut self, name: impl Into<String>) -> Self {
        self.plugs.push(Plug::method(name));
        self
    }

    /// Declares a middleware. The first declared runs outermost.
    pub fn middleware(mut self, name: impl Into<String>, spec: impl Into<MiddlewareSpec>) -> Self {
        self.middlewares.push(MiddlewareDecl {
            name: name.into(),
            spec: spec.into(),
        });
        self
    }

    /// Composes another application in place: its middlewares join the
    /// middleware list and its plugs join the plug list, both at this
    /// position and under `name` for injection.
    pub fn compose(self, name: impl Into<String>, app: &App) -> Self {
        let name = name.into();
        self.middleware(name.clone(), app.clone())
            .plug(name, app.pipeline().clone())
    }

    /// Resolves every declaration and builds the application.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidPlug`](sluice_core::PipelineError::InvalidPlug)
    /// if a plug cannot be resolved.
    pub fn build(&self) -> PipelineResult<App> {
        self.build_with(&Injections::default())
    }

    /// Builds the application with per-build overrides.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidPlug`](sluice_core::PipelineError::InvalidPlug)
    /// if a plug cannot be resolved.
    pub fn build_with(&self, injections: &Injections) -> PipelineResult<App> {
        let mut resolver = Resolver::new().with_container(Arc::clone(&self.container));
        if let Some(owner) = &self.owner {
            resolver = resolver.with_owner(Arc::clone(owner));
        }

        let pipeline = resolver.resolve_all(&self.plugs, &injections.plugs)?;
        let middlewares = self.resolve_middlewares(&injections.middlewares);

        debug!(
            plugs = pipeline.len(),
            middlewares = middlewares.len(),
            "Built pipeline application"
        );

        Ok(App::new(pipeline, middlewares, self.config.clone()))
    }

    fn resolve_middlewares(
        &self,
        injections: &HashMap<String, MiddlewareSpec>,
    ) -> Vec<MiddlewareEntry> {
        for name in injections.keys() {
            if !self.middlewares.iter().any(|decl| &decl.name == name) {
                warn!(middleware = %name, "Injection does not match any declared middleware");
            }
        }

        let mut entries = Vec::with_capacity(self.middlewares.len());
        for decl in &self.middlewares {
            let spec = injections.get(&decl.name).unwrap_or(&decl.spec);
            match spec {
                MiddlewareSpec::Middleware(middleware) => entries.push(MiddlewareEntry {
                    name: decl.name.clone(),
                    middleware: Arc::clone(middleware),
                }),
                MiddlewareSpec::App(app) => {
                    entries.extend(app.middleware_entries().iter().cloned());
                }
            }
        }
        entries
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("plugs", &self.plugs)
            .field("middlewares", &self.middlewares)
            .field("has_owner", &self.owner.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
