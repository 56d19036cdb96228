//! Test client for in-memory request handling.

use crate::error::TestError;
use crate::request::{TestRequest, TestRequestBuilder};
use crate::response::TestResponse;
use bytes::Bytes;
use http::Method;
use sluice_middleware::{FnHandler, HandlerResult, Request, RequestHandler};
use std::future::Future;
use std::sync::Arc;

/// A test client for driving an application without a network.
///
/// Any [`RequestHandler`] can be tested: a built application, a
/// middleware stack, or a plain function.
///
/// # Example
///
/// ```
/// use sluice_middleware::{Response, ResponseExt};
/// use sluice_test::TestClient;
/// use http::StatusCode;
///
/// # tokio_test::block_on(async {
/// let client = TestClient::from_fn(|_request| async {
///     Ok(Response::error(StatusCode::OK, "pong"))
/// });
///
/// let response = client.get("/ping").send().await.unwrap();
/// response.assert_status(200).assert_body_eq("pong");
/// # });
/// ```
#[must_use]
#[derive(Clone)]
pub struct TestClient {
    handler: Arc<dyn RequestHandler>,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Creates a test client for a handler.
    pub fn new(handler: impl RequestHandler) -> Self {
        Self {
            handler: Arc::new(handler),
            default_headers: Vec::new(),
        }
    }

    /// Creates a test client from an async function.
    pub fn from_fn<F, Fut>(func: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self::new(FnHandler::new(func))
    }

    /// Adds a header included in every request.
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Creates a GET request builder.
    pub fn get(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::GET, uri)
    }

    /// Creates a POST request builder.
    pub fn post(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::POST, uri)
    }

    /// Creates a PUT request builder.
    pub fn put(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::PUT, uri)
    }

    /// Creates a PATCH request builder.
    pub fn patch(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::PATCH, uri)
    }

    /// Creates a DELETE request builder.
    pub fn delete(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::DELETE, uri)
    }

    /// Creates a request builder with a custom method.
    pub fn request(&self, method: Method, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequestBuilder::new(method, uri))
    }

    /// Sends a built request.
    pub async fn send(&self, request: TestRequest) -> Result<TestResponse, TestError> {
        let response = self.handler.handle(request.into_http_request()).await?;
        TestResponse::from_http(response).await
    }
}

impl std::fmt::Debug for TestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestClient")
            .field("default_headers", &self.default_headers)
            .finish_non_exhaustive()
    }
}

/// A request builder bound to a test client.
#[must_use]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
}

impl<'a> TestClientRequest<'a> {
    fn new(client: &'a TestClient, builder: TestRequestBuilder) -> Self {
        let builder = client
            .default_headers
            .iter()
            .fold(builder, |builder, (name, value)| builder.header(name, value));
        Self { client, builder }
    }

    /// Appends a header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Sets the Content-Type header.
    pub fn content_type(mut self, content_type: impl AsRef<str>) -> Self {
        self.builder = self.builder.content_type(content_type);
        self
    }

    /// Appends a query parameter.
    pub fn query(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.query(key, value);
        self
    }

    /// Inserts a request extension.
    pub fn extension<T: Clone + Send + Sync + 'static>(mut self, value: T) -> Self {
        self.builder = self.builder.extension(value);
        self
    }

    /// Sets the raw request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Sets the request body as JSON.
    pub fn json<T: serde::Serialize>(mut self, value: &T) -> Self {
        self.builder = self.builder.json(value);
        self
    }

    /// Sets the request body as a form.
    pub fn form<T: serde::Serialize>(mut self, value: &T) -> Self {
        self.builder = self.builder.form(value);
        self
    }

    /// Sends the request.
    ///
    /// A pipeline error raised by the application is returned as
    /// [`TestError::Pipeline`].
    pub async fn send(self) -> Result<TestResponse, TestError> {
        let request = self.builder.build()?;
        self.client.send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use sluice_core::PipelineError;
    use sluice_middleware::{Response, ResponseExt};

    fn echo() -> TestClient {
        TestClient::from_fn(|request: Request| async move {
            let body = format!(
                "{} {} {}",
                request.method(),
                request.uri(),
                request
                    .headers()
                    .get("x-custom")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-")
            );
            Ok(Response::error(StatusCode::OK, &body))
        })
    }

    #[tokio::test]
    async fn test_methods_and_query() {
        let client = echo();
        client
            .delete("/items/1")
            .query("force", "true")
            .send()
            .await
            .unwrap()
            .assert_body_eq("DELETE /items/1?force=true -");
    }

    #[tokio::test]
    async fn test_default_headers() {
        let client = echo().with_default_header("X-Custom", "default-value");
        client
            .get("/")
            .send()
            .await
            .unwrap()
            .assert_body_eq("GET / default-value");
    }

    #[tokio::test]
    async fn test_pipeline_errors_surface() {
        let client = TestClient::from_fn(|_request| async {
            Err(PipelineError::internal("database unavailable"))
        });
        let err = client.get("/").send().await.unwrap_err();
        assert!(matches!(err, TestError::Pipeline(PipelineError::Internal { .. })));
    }
}
