//! The transport boundary.
//!
//! [`build_conn`] turns an incoming request into the initial, ongoing
//! [`Conn`]; [`render_response`] turns the final connection back into a
//! response. Rendering reads only the response triple (status, headers,
//! body) and treats ongoing and halted connections the same way.

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use sluice_config::BoundaryConfig;
use sluice_core::{Conn, Env, PipelineError, PipelineResult};
use sluice_middleware::{Request, Response};

/// Builds the initial connection for a request.
///
/// The body is collected in full, request facts are derived with the
/// boundary's script name and forwarded-header policy, and request
/// extensions (peer address, session) are carried into the env.
pub async fn build_conn(request: Request, config: &BoundaryConfig) -> Conn {
    let (parts, body) = request.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(never) => match never {},
    };
    Conn::new(Env::from_parts(parts, body, &config.env_options()))
}

/// Renders a connection into a response.
///
/// A missing status falls back to `default_status`, and
/// `default_content_type` is added when no operation set a `Content-Type`.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidResponse`] if the status or a header
/// cannot be carried by HTTP.
pub fn render_response(conn: Conn, config: &BoundaryConfig) -> PipelineResult<Response> {
    let parts = conn.into_response_parts();

    let code = parts.status.unwrap_or(config.default_status);
    let status = StatusCode::from_u16(code).map_err(|_| {
        PipelineError::invalid_response(format!("{code} is not a valid status code"))
    })?;

    let mut response = http::Response::new(Full::new(concat(parts.body)));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    for (key, value) in parts.headers.iter() {
        let name = HeaderName::try_from(key)
            .map_err(|_| PipelineError::invalid_response(format!("invalid header name {key:?}")))?;
        let value = HeaderValue::try_from(value).map_err(|_| {
            PipelineError::invalid_response(format!("invalid value for header {key}"))
        })?;
        headers.insert(name, value);
    }

    if let Some(content_type) = &config.default_content_type {
        if !headers.contains_key(CONTENT_TYPE) {
            let value = HeaderValue::try_from(content_type.as_str()).map_err(|_| {
                PipelineError::invalid_response(format!(
                    "invalid default content type {content_type:?}"
                ))
            })?;
            headers.insert(CONTENT_TYPE, value);
        }
    }

    Ok(response)
}

fn concat(mut chunks: Vec<Bytes>) -> Bytes {
    if chunks.len() == 1 {
        return chunks.pop().unwrap_or_default();
    }
    Bytes::from(chunks.concat())
}
