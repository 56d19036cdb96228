//! Extension operations.
//!
//! Helpers that build on the public [`Conn`] API. Each is a plain function
//! that takes a connection and returns a new one, so it can be called from
//! inside an operation or wrapped and plugged on its own.
//!
//! Session helpers require a session middleware to have inserted a
//! [`Session`](sluice_core::Session) into the request extensions; without
//! one they fail with
//! [`PipelineError::MissingMiddleware`].

use http::header::{CONTENT_TYPE, LOCATION};
use serde::Serialize;
use serde_json::Value;
use sluice_core::container::Container;
use sluice_core::{Conn, PipelineError, PipelineResult};

/// Redirects to `location` with `status` and halts the pipeline.
pub fn redirect(conn: Conn, location: &str, status: u16) -> Conn {
    conn.set_status(status)
        .add_response_header(LOCATION.as_str(), location)
        .halt()
}

/// Answers `404 Not Found` and halts the pipeline.
pub fn not_found(conn: Conn) -> Conn {
    conn.set_status(404)
        .set_response_body("Not Found")
        .halt()
}

/// Sets the response `Content-Type`.
pub fn content_type(conn: Conn, mime: &str) -> Conn {
    conn.add_response_header(CONTENT_TYPE.as_str(), mime)
}

/// Serializes `value` as the JSON response body.
///
/// # Errors
///
/// Returns [`PipelineError::Internal`] if serialization fails.
pub fn json<T: Serialize + ?Sized>(conn: Conn, value: &T) -> PipelineResult<Conn> {
    let body = serde_json::to_vec(value).map_err(|e| {
        PipelineError::internal_with_source("failed to serialize JSON body", e.into())
    })?;
    Ok(content_type(conn, "application/json").set_response_body(body))
}

/// Reads a value from the session.
pub fn fetch_session(conn: &Conn, key: &str) -> PipelineResult<Option<Value>> {
    Ok(conn.session()?.get(key))
}

/// Stores a value in the session.
///
/// The session is shared with the middleware that owns it, so the write is
/// visible outside the pipeline. The connection itself is unchanged.
pub fn add_session(conn: Conn, key: &str, value: Value) -> PipelineResult<Conn> {
    conn.session()?.insert(key, value);
    Ok(conn)
}

/// Removes a value from the session.
pub fn delete_session(conn: Conn, key: &str) -> PipelineResult<Conn> {
    conn.session()?.remove(key);
    Ok(conn)
}

/// Removes every value from the session.
pub fn clear_session(conn: Conn) -> PipelineResult<Conn> {
    conn.session()?.clear();
    Ok(conn)
}

/// Copies the container entry registered under `key` into the bag, under
/// the same key.
///
/// # Errors
///
/// Returns [`PipelineError::KeyNotFound`] if the container has no such
/// entry.
pub fn container_lookup(conn: Conn, container: &dyn Container, key: &str) -> PipelineResult<Conn> {
    let value = container
        .lookup(key)
        .ok_or_else(|| PipelineError::key_not_found(key))?;
    Ok(conn.put_value(key, value))
}
