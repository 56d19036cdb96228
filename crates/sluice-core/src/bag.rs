//! Extension storage shared between plugs.
//!
//! The [`Bag`] carries data from one operation to the next: resolved
//! dependencies, sanitized params, view locals and so on. Values are
//! type-erased and keyed by name. Cloning a bag is cheap; the first write to
//! a clone copies the key table, so earlier connections never observe later
//! writes.

use crate::error::{PipelineError, PipelineResult};
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A type-erased bag value.
pub type BagValue = Arc<dyn Any + Send + Sync>;

/// Copy-on-write key/value storage carried by a [`Conn`](crate::Conn).
#[derive(Clone, Default)]
pub struct Bag {
    entries: Arc<HashMap<String, BagValue>>,
}

impl Bag {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a bag with `value` stored under `key`.
    #[must_use]
    pub fn with<T: Send + Sync + 'static>(&self, key: impl Into<String>, value: T) -> Self {
        self.with_value(key, Arc::new(value))
    }

    /// Returns a bag with an already type-erased value stored under `key`.
    #[must_use]
    pub fn with_value(&self, key: impl Into<String>, value: BagValue) -> Self {
        let mut entries = Arc::clone(&self.entries);
        Arc::make_mut(&mut entries).insert(key.into(), value);
        Self { entries }
    }

    /// Returns a bag without `key`.
    #[must_use]
    pub fn without(&self, key: &str) -> Self {
        if !self.entries.contains_key(key) {
            return self.clone();
        }
        let mut entries = Arc::clone(&self.entries);
        Arc::make_mut(&mut entries).remove(key);
        Self { entries }
    }

    /// Returns the value under `key` if it exists and has type `T`.
    #[must_use]
    pub fn get<T: Send + Sync + 'static>(&self, key: &str) -> Option<&T> {
        self.entries.get(key).and_then(|v| v.downcast_ref())
    }

    /// Returns the type-erased value under `key`.
    #[must_use]
    pub fn get_value(&self, key: &str) -> Option<&BagValue> {
        self.entries.get(key)
    }

    /// Returns the value under `key`.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::KeyNotFound`] if the key is absent
    /// - [`PipelineError::BagTypeMismatch`] if the value has another type
    pub fn fetch<T: Send + Sync + 'static>(&self, key: &str) -> PipelineResult<&T> {
        let value = self
            .entries
            .get(key)
            .ok_or_else(|| PipelineError::key_not_found(key))?;
        value
            .downcast_ref()
            .ok_or_else(|| PipelineError::BagTypeMismatch {
                key: key.to_string(),
                expected: type_name::<T>(),
            })
    }

    /// Checks if a value is stored under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the stored keys in arbitrary order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Returns the number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the bag is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Bag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("Bag").field("keys", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_does_not_touch_original() {
        let empty = Bag::new();
        let filled = empty.with("user", "alice".to_string());

        assert!(empty.is_empty());
        assert_eq!(filled.get::<String>("user"), Some(&"alice".to_string()));
    }

    #[test]
    fn test_clone_then_write_is_isolated() {
        let first = Bag::new().with("a", 1_u32);
        let second = first.with("b", 2_u32);

        assert!(!first.contains("b"));
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn test_fetch_missing_key() {
        let err = Bag::new().fetch::<u32>("missing").unwrap_err();
        assert!(matches!(err, PipelineError::KeyNotFound { key } if key == "missing"));
    }

    #[test]
    fn test_fetch_wrong_type() {
        let bag = Bag::new().with("count", 3_u32);
        let err = bag.fetch::<String>("count").unwrap_err();
        assert!(matches!(err, PipelineError::BagTypeMismatch { .. }));
    }

    #[test]
    fn test_without() {
        let bag = Bag::new().with("a", 1_u8).with("b", 2_u8);
        let trimmed = bag.without("a");

        assert!(bag.contains("a"));
        assert!(!trimmed.contains("a"));
        assert!(trimmed.contains("b"));
    }
}
