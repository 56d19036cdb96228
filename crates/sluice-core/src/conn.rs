//! The connection value threaded through a pipeline.
//!
//! A [`Conn`] pairs the read-only request facts ([`Env`]) with the response
//! being accumulated: status, headers, body chunks and the [`Bag`]. Every
//! setter consumes the connection and returns a new one, so an operation can
//! only ever hand forward a fresh value; `Conn` is cheap to clone when the
//! previous value must be kept around.
//!
//! A connection is either [`ConnState::Ongoing`] or [`ConnState::Halted`].
//! [`Conn::halt`] is the only transition and there is no way back: every
//! setter carries the state over unchanged, so a halted connection stays
//! halted through any number of later modifications.

use crate::bag::{Bag, BagValue};
use crate::env::Env;
use crate::error::{PipelineError, PipelineResult};
use crate::headers::Headers;
use crate::session::{Session, SESSION_KEY};
use bytes::Bytes;
use http::Method;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;

/// Lifecycle state of a [`Conn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnState {
    /// The pipeline may continue.
    Ongoing,
    /// The pipeline must stop; no further operations run.
    Halted,
}

/// A value accepted by [`Conn::set_response_body`].
///
/// Scalars (`&str`, `String`, `Bytes`, `Vec<u8>`) become a single chunk.
/// Sequences (`Vec<String>`, `Vec<&str>`, `Vec<Bytes>`) replace the chunk
/// list wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// One chunk, wrapped into a one-element body.
    Chunk(Bytes),
    /// A complete replacement chunk list.
    Chunks(Vec<Bytes>),
}

impl Body {
    fn into_chunks(self) -> Vec<Bytes> {
        match self {
            Self::Chunk(chunk) => vec![chunk],
            Self::Chunks(chunks) => chunks,
        }
    }
}

impl From<&str> for Body {
    fn from(value: &str) -> Self {
        Self::Chunk(Bytes::copy_from_slice(value.as_bytes()))
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Self::Chunk(Bytes::from(value))
    }
}

impl From<Bytes> for Body {
    fn from(value: Bytes) -> Self {
        Self::Chunk(value)
    }
}

impl From<Vec<u8>> for Body {
    fn from(value: Vec<u8>) -> Self {
        Self::Chunk(Bytes::from(value))
    }
}

impl From<Vec<Bytes>> for Body {
    fn from(value: Vec<Bytes>) -> Self {
        Self::Chunks(value)
    }
}

impl From<Vec<String>> for Body {
    fn from(value: Vec<String>) -> Self {
        Self::Chunks(value.into_iter().map(Bytes::from).collect())
    }
}

impl From<Vec<&str>> for Body {
    fn from(value: Vec<&str>) -> Self {
        Self::Chunks(
            value
                .into_iter()
                .map(|s| Bytes::copy_from_slice(s.as_bytes()))
                .collect(),
        )
    }
}

/// The response-side triple handed to the transport boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseParts {
    /// Status code, `None` if no operation set one.
    pub status: Option<u16>,
    /// Normalized response headers.
    pub headers: Headers,
    /// Body chunks in order.
    pub body: Vec<Bytes>,
}

/// Immutable request/response context.
///
/// # Example
///
/// ```
/// use sluice_core::Conn;
///
/// let conn = Conn::default()
///     .set_status(200)
///     .add_response_header("content_type", "text/plain")
///     .set_response_body("Hello");
///
/// let parts = conn.response_parts();
/// assert_eq!(parts.status, Some(200));
/// assert_eq!(parts.headers.get("Content-Type"), Some("text/plain"));
/// assert_eq!(parts.body, vec!["Hello"]);
/// ```
#[derive(Debug, Clone)]
pub struct Conn {
    env: Arc<Env>,
    status: Option<u16>,
    response_body: Vec<Bytes>,
    response_headers: Headers,
    bag: Bag,
    state: ConnState,
}

impl Conn {
    /// Creates an ongoing connection with response defaults: no status, one
    /// empty body chunk, no headers and an empty bag.
    #[must_use]
    pub fn new(env: Env) -> Self {
        Self {
            env: Arc::new(env),
            status: None,
            response_body: vec![Bytes::new()],
            response_headers: Headers::new(),
            bag: Bag::new(),
            state: ConnState::Ongoing,
        }
    }

    // Lifecycle

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ConnState {
        self.state
    }

    /// Returns `true` while the pipeline may continue.
    #[must_use]
    pub fn is_ongoing(&self) -> bool {
        self.state == ConnState::Ongoing
    }

    /// Returns `true` once the connection has been halted.
    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.state == ConnState::Halted
    }

    /// Returns the same connection in the halted state.
    ///
    /// All attribute values are kept; only the state changes.
    #[must_use]
    pub fn halt(mut self) -> Self {
        self.state = ConnState::Halted;
        self
    }

    /// Alias of [`Conn::halt`].
    #[must_use]
    pub fn taint(self) -> Self {
        self.halt()
    }

    // Response setters

    /// Sets the response status.
    #[must_use]
    pub fn set_status(mut self, code: u16) -> Self {
        self.status = Some(code);
        self
    }

    /// Sets the response body.
    ///
    /// A scalar is wrapped into a one-chunk body; a sequence replaces the
    /// chunk list. To append, read [`Conn::response_body`], extend it and
    /// pass the whole sequence back.
    ///
    /// ```
    /// use sluice_core::Conn;
    ///
    /// let conn = Conn::default().set_response_body("foo");
    /// let mut chunks = conn.response_body().to_vec();
    /// chunks.push("bar".into());
    /// let conn = conn.set_response_body(chunks);
    /// assert_eq!(conn.response_body(), ["foo", "bar"]);
    /// ```
    #[must_use]
    pub fn set_response_body(mut self, body: impl Into<Body>) -> Self {
        self.response_body = body.into().into_chunks();
        self
    }

    /// Inserts or overwrites a response header under its normalized name.
    #[must_use]
    pub fn add_response_header(mut self, key: &str, value: impl Into<String>) -> Self {
        self.response_headers.insert(key, value);
        self
    }

    /// Removes a response header, whatever spelling is used for `key`.
    #[must_use]
    pub fn delete_response_header(mut self, key: &str) -> Self {
        self.response_headers.remove(key);
        self
    }

    // Bag

    /// Stores `value` in the bag under `key`.
    #[must_use]
    pub fn put<T: Send + Sync + 'static>(mut self, key: impl Into<String>, value: T) -> Self {
        self.bag = self.bag.with(key, value);
        self
    }

    /// Stores an already type-erased value in the bag.
    #[must_use]
    pub fn put_value(mut self, key: impl Into<String>, value: BagValue) -> Self {
        self.bag = self.bag.with_value(key, value);
        self
    }

    /// Removes `key` from the bag.
    #[must_use]
    pub fn remove(mut self, key: &str) -> Self {
        self.bag = self.bag.without(key);
        self
    }

    /// Fetches a bag value.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::KeyNotFound`] if the key is absent, or
    /// [`PipelineError::BagTypeMismatch`] if it holds another type.
    pub fn fetch<T: Send + Sync + 'static>(&self, key: &str) -> PipelineResult<&T> {
        self.bag.fetch(key)
    }

    /// Fetches a bag value, returning `default` when the key is absent.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::BagTypeMismatch`] if the key holds another
    /// type.
    pub fn fetch_or<T: Clone + Send + Sync + 'static>(
        &self,
        key: &str,
        default: T,
    ) -> PipelineResult<T> {
        self.fetch_or_else(key, || default)
    }

    /// Fetches a bag value, computing a fallback when the key is absent.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::BagTypeMismatch`] if the key holds another
    /// type.
    pub fn fetch_or_else<T, F>(&self, key: &str, fallback: F) -> PipelineResult<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        match self.bag.fetch::<T>(key) {
            Ok(value) => Ok(value.clone()),
            Err(PipelineError::KeyNotFound { .. }) => Ok(fallback()),
            Err(err) => Err(err),
        }
    }

    /// Returns the bag.
    #[must_use]
    pub fn bag(&self) -> &Bag {
        &self.bag
    }

    // Response readers

    /// Returns the response status, if set.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    /// Returns the response body chunks.
    #[must_use]
    pub fn response_body(&self) -> &[Bytes] {
        &self.response_body
    }

    /// Returns the response headers.
    #[must_use]
    pub fn response_headers(&self) -> &Headers {
        &self.response_headers
    }

    /// Returns one response header.
    #[must_use]
    pub fn response_header(&self, key: &str) -> Option<&str> {
        self.response_headers.get(key)
    }

    /// Returns the `(status, headers, body)` triple for the transport
    /// boundary. Identical for ongoing and halted connections.
    #[must_use]
    pub fn response_parts(&self) -> ResponseParts {
        ResponseParts {
            status: self.status,
            headers: self.response_headers.clone(),
            body: self.response_body.clone(),
        }
    }

    /// Consuming variant of [`Conn::response_parts`].
    #[must_use]
    pub fn into_response_parts(self) -> ResponseParts {
        ResponseParts {
            status: self.status,
            headers: self.response_headers,
            body: self.response_body,
        }
    }

    // Request readers

    /// Returns the request facts.
    #[must_use]
    pub fn env(&self) -> &Env {
        &self.env
    }

    /// Returns the request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        self.env.method()
    }

    /// Returns the URL scheme.
    #[must_use]
    pub fn scheme(&self) -> &str {
        self.env.scheme()
    }

    /// Returns the requested host.
    #[must_use]
    pub fn host(&self) -> &str {
        self.env.host()
    }

    /// Returns the requested port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.env.port()
    }

    /// Returns the client ip, if known.
    #[must_use]
    pub fn ip(&self) -> Option<IpAddr> {
        self.env.ip()
    }

    /// Returns the mount prefix.
    #[must_use]
    pub fn script_name(&self) -> &str {
        self.env.script_name()
    }

    /// Returns the path below the mount prefix.
    #[must_use]
    pub fn path_info(&self) -> &str {
        self.env.path_info()
    }

    /// Returns the raw query string.
    #[must_use]
    pub fn query_string(&self) -> &str {
        self.env.query_string()
    }

    /// Returns the request body.
    #[must_use]
    pub fn request_body(&self) -> &Bytes {
        self.env.body()
    }

    /// Returns the normalized request headers.
    #[must_use]
    pub fn request_headers(&self) -> &Headers {
        self.env.headers()
    }

    /// Returns one request header.
    #[must_use]
    pub fn request_header(&self, key: &str) -> Option<&str> {
        self.env.headers().get(key)
    }

    /// Returns `scheme://host[:port]`, omitting the default port.
    #[must_use]
    pub fn base_url(&self) -> String {
        let scheme = self.scheme();
        let default_port = matches!((scheme, self.port()), ("http", 80) | ("https", 443));
        if default_port {
            format!("{scheme}://{}", self.host())
        } else {
            format!("{scheme}://{}:{}", self.host(), self.port())
        }
    }

    /// Returns the script name joined with the path info.
    #[must_use]
    pub fn path(&self) -> String {
        format!("{}{}", self.script_name(), self.path_info())
    }

    /// Returns the path with the query string appended when present.
    #[must_use]
    pub fn full_path(&self) -> String {
        let query = self.query_string();
        if query.is_empty() {
            self.path()
        } else {
            format!("{}?{query}", self.path())
        }
    }

    /// Returns the full request URL.
    #[must_use]
    pub fn url(&self) -> String {
        format!("{}{}", self.base_url(), self.full_path())
    }

    /// Returns the request parameters: query string pairs merged with an
    /// `application/x-www-form-urlencoded` body. Body values win.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MalformedParams`] if decoding fails.
    pub fn params(&self) -> PipelineResult<HashMap<String, String>> {
        let mut params: HashMap<String, String> =
            serde_urlencoded::from_str::<Vec<(String, String)>>(self.query_string())?
                .into_iter()
                .collect();

        let is_form = self
            .request_header("Content-Type")
            .is_some_and(is_form_media_type);
        if is_form {
            let pairs = serde_urlencoded::from_bytes::<Vec<(String, String)>>(self.request_body())?;
            params.extend(pairs);
        }
        Ok(params)
    }

    /// Returns the session published by the session middleware.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MissingMiddleware`] if no session middleware
    /// ran before the pipeline.
    pub fn session(&self) -> PipelineResult<Session> {
        self.env
            .extension::<Session>()
            .cloned()
            .ok_or(PipelineError::MissingMiddleware {
                middleware: "session",
                key: SESSION_KEY,
            })
    }
}

fn is_form_media_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .eq_ignore_ascii_case("application/x-www-form-urlencoded")
}

impl Default for Conn {
    fn default() -> Self {
        Self::new(Env::default())
    }
}
