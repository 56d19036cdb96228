//! # Sluice Test
//!
//! In-memory testing utilities for Sluice applications.
//!
//! [`TestClient`] drives any [`RequestHandler`](sluice_middleware::RequestHandler)
//! without binding a socket: a built application, a bare middleware stack,
//! or an async function.
//!
//! ## Example
//!
//! ```ignore
//! use sluice_test::TestClient;
//!
//! #[tokio::test]
//! async fn test_greeting() {
//!     let client = TestClient::new(app);
//!
//!     client
//!         .get("/hello")
//!         .query("name", "Alice")
//!         .send()
//!         .await
//!         .unwrap()
//!         .assert_status(200)
//!         .assert_body_eq("Hello, Alice");
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/sluice-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::{TestRequest, TestRequestBuilder};
pub use response::TestResponse;
