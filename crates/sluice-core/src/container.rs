//! Dependency lookup.
//!
//! Plugs can name their implementation by a container key instead of
//! carrying it inline. The pipeline only needs [`Container::lookup`]; any
//! type can act as a container. [`Registry`] is the bundled implementation.
//!
//! # Example
//!
//! ```rust
//! use sluice_core::container::{Container, Registry};
//! use sluice_core::{Conn, Operation};
//!
//! let registry = Registry::new()
//!     .register_operation("plug.hello", Operation::infallible(|conn: Conn| {
//!         conn.set_response_body("Hello")
//!     }))
//!     .register("config.greeting", "Hello".to_string());
//!
//! assert!(registry.lookup("plug.hello").is_some());
//! let greeting = registry.resolve::<String>("config.greeting");
//! assert_eq!(greeting.as_deref(), Some(&"Hello".to_string()));
//! ```

use crate::bag::BagValue;
use crate::operation::Operation;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Key/value lookup used to resolve plugs and dependencies.
///
/// Containers are read-only once a pipeline is built and are shared by every
/// request, hence the `Send + Sync` bound.
pub trait Container: Send + Sync + 'static {
    /// Returns the value registered under `key`.
    fn lookup(&self, key: &str) -> Option<BagValue>;
}

/// A container with nothing registered.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyContainer;

impl Container for EmptyContainer {
    fn lookup(&self, _key: &str) -> Option<BagValue> {
        None
    }
}

impl<F> Container for F
where
    F: Fn(&str) -> Option<BagValue> + Send + Sync + 'static,
{
    fn lookup(&self, key: &str) -> Option<BagValue> {
        self(key)
    }
}

/// A string-keyed container of shared values.
///
/// Values are stored as `Arc<dyn Any + Send + Sync>`; callable entries are
/// stored as [`Operation`] so the resolver can recognize them.
#[derive(Clone, Default)]
pub struct Registry {
    entries: HashMap<String, BagValue>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a value under `key`, replacing any previous entry.
    #[must_use]
    pub fn register<T: Send + Sync + 'static>(mut self, key: impl Into<String>, value: T) -> Self {
        self.entries.insert(key.into(), Arc::new(value));
        self
    }

    /// Registers a callable under `key`.
    #[must_use]
    pub fn register_operation(self, key: impl Into<String>, operation: Operation) -> Self {
        self.register(key, operation)
    }

    /// Resolves a typed value.
    ///
    /// Returns `None` if the key is absent or holds another type.
    #[must_use]
    pub fn resolve<T: Send + Sync + 'static>(&self, key: &str) -> Option<Arc<T>> {
        self.entries
            .get(key)
            .and_then(|v| Arc::clone(v).downcast::<T>().ok())
    }

    /// Checks if a key is registered.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the number of registered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Container for Registry {
    fn lookup(&self, key: &str) -> Option<BagValue> {
        self.entries.get(key).cloned()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("entry_count", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_container() {
        assert!(EmptyContainer.lookup("anything").is_none());
    }

    #[test]
    fn test_registry_lookup_and_resolve() {
        let registry = Registry::new().register("answer", 42_u32);

        assert!(registry.contains("answer"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.resolve::<u32>("answer").as_deref(), Some(&42));
        assert!(registry.resolve::<String>("answer").is_none());
        assert!(registry.lookup("missing").is_none());
    }

    #[test]
    fn test_operations_are_recognizable() {
        let registry = Registry::new().register_operation("plug.noop", Operation::identity());
        let value = registry.lookup("plug.noop").unwrap();
        assert!(value.downcast_ref::<Operation>().is_some());
    }

    #[test]
    fn test_closure_container() {
        let container = |key: &str| -> Option<BagValue> {
            (key == "greeting").then(|| Arc::new("hi") as BagValue)
        };
        assert!(container.lookup("greeting").is_some());
        assert!(container.lookup("other").is_none());
    }
}
