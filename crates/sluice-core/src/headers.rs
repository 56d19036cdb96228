//! Normalized header maps.
//!
//! Request and response headers are stored under one canonical spelling of
//! their name: underscores become dashes and every dash-delimited segment is
//! capitalized (`content_type`, `CONTENT-TYPE` and `Content-Type` all become
//! `Content-Type`). Lookups, overwrites and deletes normalize the key first,
//! so callers never have to care which spelling they use.

use http::header::COOKIE;
use http::HeaderMap;
use indexmap::IndexMap;

/// Normalizes a header name to its canonical spelling.
///
/// The function is idempotent: normalizing an already normalized key
/// returns it unchanged.
///
/// # Example
///
/// ```
/// use sluice_core::headers::normalize_key;
///
/// assert_eq!(normalize_key("content_type"), "Content-Type");
/// assert_eq!(normalize_key("X-REQUEST-ID"), "X-Request-Id");
/// ```
#[must_use]
pub fn normalize_key(key: &str) -> String {
    key.to_ascii_lowercase()
        .replace('_', "-")
        .split('-')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join("-")
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// An insertion-ordered header map keyed by normalized names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: IndexMap<String, String>,
}

impl Headers {
    /// Creates an empty header map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a normalized map from transport headers.
    ///
    /// Repeated headers are joined with `", "`, except `Cookie`, whose
    /// fields are joined with `"; "`. Values that are not visible ASCII are
    /// decoded lossily.
    #[must_use]
    pub fn from_header_map(map: &HeaderMap) -> Self {
        let mut headers = Self::new();
        for (name, value) in map {
            let key = normalize_key(name.as_str());
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            match headers.entries.get_mut(&key) {
                Some(existing) => {
                    existing.push_str(if *name == COOKIE { "; " } else { ", " });
                    existing.push_str(&value);
                }
                None => {
                    headers.entries.insert(key, value);
                }
            }
        }
        headers
    }

    /// Returns the value stored under `key`, in any spelling.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(&normalize_key(key)).map(String::as_str)
    }

    /// Returns true if a value is stored under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(&normalize_key(key))
    }

    /// Inserts or overwrites a header.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.entries.insert(normalize_key(key), value.into());
    }

    /// Removes a header, returning its value if it was present.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.shift_remove(&normalize_key(key))
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the number of headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (key, value) in iter {
            headers.insert(key.as_ref(), value);
        }
        headers
    }
}
