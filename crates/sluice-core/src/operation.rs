//! The unit of work in a pipeline.

use crate::conn::Conn;
use crate::error::PipelineResult;
use std::fmt;
use std::sync::Arc;

/// Signature shared by every operation.
pub type OperationFn = dyn Fn(Conn) -> PipelineResult<Conn> + Send + Sync + 'static;

/// A function from [`Conn`] to [`Conn`].
///
/// Operations hold no state beyond what their closure captures, so a single
/// value can be shared by every request a pipeline serves. Cloning is a
/// reference-count bump.
///
/// # Example
///
/// ```
/// use sluice_core::{Conn, Operation};
///
/// let greet = Operation::new(|conn: Conn| Ok(conn.set_response_body("Hello")));
/// let conn = greet.call(Conn::default()).unwrap();
/// assert_eq!(conn.response_body(), ["Hello"]);
/// ```
#[derive(Clone)]
pub struct Operation {
    func: Arc<OperationFn>,
}

impl Operation {
    /// Wraps a fallible function.
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(Conn) -> PipelineResult<Conn> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
        }
    }

    /// Wraps an infallible function.
    pub fn infallible<F>(func: F) -> Self
    where
        F: Fn(Conn) -> Conn + Send + Sync + 'static,
    {
        Self::new(move |conn| Ok(func(conn)))
    }

    /// An operation that returns the connection unchanged.
    #[must_use]
    pub fn identity() -> Self {
        Self::new(Ok)
    }

    /// Invokes the operation.
    pub fn call(&self, conn: Conn) -> PipelineResult<Conn> {
        (self.func)(conn)
    }

    /// Returns true if both values share the same underlying function.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation").finish_non_exhaustive()
    }
}
