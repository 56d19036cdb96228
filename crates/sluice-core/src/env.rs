//! Read-only request facts.
//!
//! An [`Env`] is derived once from the transport request when a connection is
//! created and is never modified afterwards. It keeps the raw transport data
//! (method, URI, headers, extensions) next to the values computed from it
//! (scheme, host, port, client ip, script name, path info, query string).

use crate::headers::Headers;
use bytes::Bytes;
use http::{request::Parts, Extensions, HeaderMap, Method, Uri, Version};
use std::net::{IpAddr, SocketAddr};

/// Peer address of the connection, inserted into request extensions by the
/// hosting transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteAddr(pub SocketAddr);

/// Options controlling how request facts are derived.
#[derive(Debug, Clone, Default)]
pub struct EnvOptions {
    /// Mount prefix of the application. Stripped from the request path to
    /// form the path info.
    pub script_name: String,
    /// Whether `X-Forwarded-*` headers are trusted.
    pub trust_forwarded_headers: bool,
}

/// Immutable request data carried by every [`Conn`](crate::Conn).
#[derive(Debug, Clone)]
pub struct Env {
    method: Method,
    uri: Uri,
    version: Version,
    raw_headers: HeaderMap,
    headers: Headers,
    extensions: Extensions,
    scheme: String,
    host: String,
    port: u16,
    ip: Option<IpAddr>,
    script_name: String,
    path_info: String,
    query_string: String,
    body: Bytes,
}

impl Env {
    /// Derives the request facts from transport request parts and a fully
    /// collected body.
    #[must_use]
    pub fn from_parts(parts: Parts, body: Bytes, options: &EnvOptions) -> Self {
        let Parts {
            method,
            uri,
            version,
            headers: raw_headers,
            extensions,
            ..
        } = parts;

        let headers = Headers::from_header_map(&raw_headers);
        let forwarded = |name: &str| {
            if options.trust_forwarded_headers {
                headers
                    .get(name)
                    .and_then(|v| v.split(',').next())
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
            } else {
                None
            }
        };

        let scheme = forwarded("X-Forwarded-Proto")
            .or_else(|| uri.scheme_str().map(str::to_ascii_lowercase))
            .unwrap_or_else(|| "http".to_string());

        let authority = forwarded("X-Forwarded-Host")
            .or_else(|| uri.authority().map(|a| a.as_str().to_string()))
            .or_else(|| headers.get("Host").map(str::to_string));
        let (host, explicit_port) = match authority.as_deref() {
            Some(authority) => split_host_port(authority),
            None => ("localhost".to_string(), None),
        };
        let port = explicit_port.unwrap_or_else(|| default_port(&scheme));

        let ip = forwarded("X-Forwarded-For")
            .and_then(|v| v.parse().ok())
            .or_else(|| extensions.get::<RemoteAddr>().map(|addr| addr.0.ip()));

        let script_name = options.script_name.trim_end_matches('/').to_string();
        let path_info = strip_script_name(uri.path(), &script_name);
        let query_string = uri.query().unwrap_or_default().to_string();

        Self {
            method,
            uri,
            version,
            raw_headers,
            headers,
            extensions,
            scheme,
            host,
            port,
            ip,
            script_name,
            path_info,
            query_string,
            body,
        }
    }

    /// Returns the request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URI as received.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the HTTP version.
    #[must_use]
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns the transport headers as received.
    #[must_use]
    pub fn raw_headers(&self) -> &HeaderMap {
        &self.raw_headers
    }

    /// Returns the normalized request headers.
    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the transport extensions (values placed by middleware).
    #[must_use]
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Returns the extension of type `T`, if a middleware placed one.
    #[must_use]
    pub fn extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions.get::<T>()
    }

    /// Returns the URL scheme (`http` or `https`).
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns the requested host name, without port.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the requested port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the client ip, if known.
    #[must_use]
    pub fn ip(&self) -> Option<IpAddr> {
        self.ip
    }

    /// Returns the mount prefix of the application.
    #[must_use]
    pub fn script_name(&self) -> &str {
        &self.script_name
    }

    /// Returns the request path below the mount prefix.
    #[must_use]
    pub fn path_info(&self) -> &str {
        &self.path_info
    }

    /// Returns the raw query string, empty if there is none.
    #[must_use]
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// Returns the request body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

impl Default for Env {
    /// A `GET /` request to `http://localhost` with no headers or body.
    fn default() -> Self {
        let (parts, ()) = http::Request::new(()).into_parts();
        Self::from_parts(parts, Bytes::new(), &EnvOptions::default())
    }
}

fn default_port(scheme: &str) -> u16 {
    if scheme == "https" {
        443
    } else {
        80
    }
}

/// Splits `host[:port]`, keeping bracketed IPv6 literals intact.
fn split_host_port(authority: &str) -> (String, Option<u16>) {
    if let Some(rest) = authority.strip_prefix('[') {
        if let Some((host, tail)) = rest.split_once(']') {
            let port = tail.strip_prefix(':').and_then(|p| p.parse().ok());
            return (format!("[{host}]"), port);
        }
    }
    match authority.rsplit_once(':') {
        Some((host, port)) => match port.parse() {
            Ok(port) => (host.to_ascii_lowercase(), Some(port)),
            Err(_) => (authority.to_ascii_lowercase(), None),
        },
        None => (authority.to_ascii_lowercase(), None),
    }
}

fn strip_script_name(path: &str, script_name: &str) -> String {
    if script_name.is_empty() {
        return path.to_string();
    }
    match path.strip_prefix(script_name) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.to_string(),
        _ => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_for(request: http::Request<()>, options: &EnvOptions) -> Env {
        let (parts, ()) = request.into_parts();
        Env::from_parts(parts, Bytes::new(), options)
    }

    #[test]
    fn test_default_env() {
        let env = Env::default();
        assert_eq!(env.method(), Method::GET);
        assert_eq!(env.scheme(), "http");
        assert_eq!(env.host(), "localhost");
        assert_eq!(env.port(), 80);
        assert_eq!(env.path_info(), "/");
        assert_eq!(env.query_string(), "");
        assert!(env.ip().is_none());
    }

    #[test]
    fn test_host_header_and_query() {
        let request = http::Request::builder()
            .method("POST")
            .uri("/users?page=2")
            .header("host", "Example.com:8080")
            .body(())
            .unwrap();
        let env = env_for(request, &EnvOptions::default());

        assert_eq!(env.host(), "example.com");
        assert_eq!(env.port(), 8080);
        assert_eq!(env.query_string(), "page=2");
        assert_eq!(env.headers().get("host"), Some("Example.com:8080"));
    }

    #[test]
    fn test_absolute_uri_wins_over_host_header() {
        let request = http::Request::builder()
            .uri("https://api.example.com/v1")
            .header("host", "ignored.example.com")
            .body(())
            .unwrap();
        let env = env_for(request, &EnvOptions::default());

        assert_eq!(env.scheme(), "https");
        assert_eq!(env.host(), "api.example.com");
        assert_eq!(env.port(), 443);
    }

    #[test]
    fn test_forwarded_headers_only_when_trusted() {
        let build = || {
            http::Request::builder()
                .uri("/")
                .header("host", "internal:9000")
                .header("x-forwarded-proto", "https")
                .header("x-forwarded-host", "public.example.com")
                .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
                .body(())
                .unwrap()
        };

        let untrusted = env_for(build(), &EnvOptions::default());
        assert_eq!(untrusted.scheme(), "http");
        assert_eq!(untrusted.host(), "internal");
        assert!(untrusted.ip().is_none());

        let options = EnvOptions {
            trust_forwarded_headers: true,
            ..EnvOptions::default()
        };
        let trusted = env_for(build(), &options);
        assert_eq!(trusted.scheme(), "https");
        assert_eq!(trusted.host(), "public.example.com");
        assert_eq!(trusted.port(), 443);
        assert_eq!(trusted.ip(), "203.0.113.9".parse().ok());
    }

    #[test]
    fn test_remote_addr_extension() {
        let mut request = http::Request::new(());
        request
            .extensions_mut()
            .insert(RemoteAddr("127.0.0.1:5555".parse().unwrap()));
        let env = env_for(request, &EnvOptions::default());

        assert_eq!(env.ip(), "127.0.0.1".parse().ok());
    }

    #[test]
    fn test_script_name_is_stripped() {
        let options = EnvOptions {
            script_name: "/admin/".to_string(),
            ..EnvOptions::default()
        };
        let request = http::Request::builder()
            .uri("/admin/users")
            .body(())
            .unwrap();
        let env = env_for(request, &options);

        assert_eq!(env.script_name(), "/admin");
        assert_eq!(env.path_info(), "/users");
    }

    #[test]
    fn test_script_name_requires_segment_boundary() {
        assert_eq!(strip_script_name("/administrator", "/admin"), "/administrator");
        assert_eq!(strip_script_name("/admin", "/admin"), "");
    }

    #[test]
    fn test_split_host_port_ipv6() {
        assert_eq!(
            split_host_port("[::1]:3000"),
            ("[::1]".to_string(), Some(3000))
        );
        assert_eq!(split_host_port("[::1]"), ("[::1]".to_string(), None));
    }
}
