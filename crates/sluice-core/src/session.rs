//! Request session handle.
//!
//! Sessions are owned by an external session middleware. The middleware
//! inserts a [`Session`] into the request extensions before the pipeline
//! runs and persists it after the response comes back. Operations reach it
//! through [`Conn::session`](crate::Conn::session).
//!
//! Unlike the rest of the connection, a session is a shared resource: writes
//! are visible to every clone of the handle, which is what lets the
//! middleware observe what the pipeline stored.

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Env key under which the session middleware publishes the session.
pub const SESSION_KEY: &str = "sluice.session";

/// Shared, interior-mutable session data.
#[derive(Debug, Clone, Default)]
pub struct Session {
    data: Arc<RwLock<HashMap<String, Value>>>,
}

impl Session {
    /// Creates an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session pre-populated with `data`.
    #[must_use]
    pub fn from_map(data: HashMap<String, Value>) -> Self {
        Self {
            data: Arc::new(RwLock::new(data)),
        }
    }

    /// Returns a copy of the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.data.read().get(key).cloned()
    }

    /// Stores `value` under `key`.
    pub fn insert(&self, key: impl Into<String>, value: Value) {
        self.data.write().insert(key.into(), value);
    }

    /// Removes `key`, returning its value.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.data.write().remove(key)
    }

    /// Removes every key.
    pub fn clear(&self) {
        self.data.write().clear();
    }

    /// Returns a snapshot of the session contents.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.data.read().clone()
    }

    /// Returns the number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Returns `true` if the session holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}
