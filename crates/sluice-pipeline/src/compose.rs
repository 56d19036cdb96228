//! The composition engine.
//!
//! [`run`] folds resolved steps over a connection, left to right. A halted
//! connection short-circuits the fold: the remaining steps are never invoked
//! and the halted value is returned as is. An error from a step ends the fold
//! immediately and is propagated to the caller.
//!
//! The fold is strictly sequential. Each step sees every bag write made by
//! the steps before it.

use sluice_core::{Conn, Operation, PipelineResult};
use tracing::{debug, trace};

/// A resolved step: a plug name and the operation it resolved to.
#[derive(Debug, Clone)]
pub struct Step {
    name: String,
    operation: Operation,
}

impl Step {
    /// Creates a step.
    pub fn new(name: impl Into<String>, operation: Operation) -> Self {
        Self {
            name: name.into(),
            operation,
        }
    }

    /// Returns the plug name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the operation.
    #[must_use]
    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    /// Invokes the operation, naming this step in an invalid-result error.
    pub fn call(&self, conn: Conn) -> PipelineResult<Conn> {
        self.operation
            .call(conn)
            .map_err(|err| err.with_plug(&self.name))
    }
}

/// Runs `steps` over `conn`.
///
/// Returns the last connection produced, ongoing if every step ran and
/// halted if some step halted it.
///
/// # Errors
///
/// Returns the first error produced by a step; no later step runs.
///
/// # Example
///
/// ```
/// use sluice_core::{Conn, Operation};
/// use sluice_pipeline::compose::{run, Step};
///
/// let steps = vec![
///     Step::new("status", Operation::infallible(|c: Conn| c.set_status(200))),
///     Step::new("body", Operation::infallible(|c: Conn| c.set_response_body("foo"))),
///     Step::new("halt", Operation::infallible(Conn::halt)),
///     Step::new("never", Operation::infallible(|c: Conn| c.set_response_body("bar"))),
/// ];
///
/// let conn = run(&steps, Conn::default()).unwrap();
/// assert!(conn.is_halted());
/// assert_eq!(conn.response_body(), ["foo"]);
/// ```
pub fn run(steps: &[Step], conn: Conn) -> PipelineResult<Conn> {
    let mut conn = conn;
    for (index, step) in steps.iter().enumerate() {
        if conn.is_halted() {
            debug!(
                next_plug = step.name(),
                skipped = steps.len() - index,
                "Pipeline halted, skipping remaining plugs"
            );
            break;
        }

        trace!(plug = step.name(), "Running plug");
        conn = step.call(conn)?;

        if conn.is_halted() {
            debug!(plug = step.name(), "Plug halted the pipeline");
        }
    }
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sluice_core::PipelineError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting(counter: &Arc<AtomicUsize>) -> Operation {
        let counter = Arc::clone(counter);
        Operation::infallible(move |conn| {
            counter.fetch_add(1, Ordering::SeqCst);
            conn
        })
    }

    #[test]
    fn test_empty_steps_return_input() {
        let conn = run(&[], Conn::default().set_status(204)).unwrap();
        assert_eq!(conn.status(), Some(204));
        assert!(conn.is_ongoing());
    }

    #[test]
    fn test_runs_in_order() {
        let steps = vec![
            Step::new("status", Operation::infallible(|c| c.set_status(200))),
            Step::new("body", Operation::infallible(|c| c.set_response_body("foo"))),
        ];

        let parts = run(&steps, Conn::default()).unwrap().into_response_parts();
        assert_eq!(parts.status, Some(200));
        assert!(parts.headers.is_empty());
        assert_eq!(parts.body, vec!["foo"]);
    }

    #[test]
    fn test_halt_short_circuits() {
        let counter = Arc::new(AtomicUsize::new(0));
        let steps = vec![
            Step::new("first", counting(&counter)),
            Step::new("halt", Operation::infallible(Conn::halt)),
            Step::new("third", counting(&counter)),
        ];

        let conn = run(&steps, Conn::default()).unwrap();
        assert!(conn.is_halted());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_halted_input_runs_nothing() {
        let counter = Arc::new(AtomicUsize::new(0));
        let steps = vec![Step::new("only", counting(&counter))];

        let conn = run(&steps, Conn::default().halt()).unwrap();
        assert!(conn.is_halted());
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_invalid_result_is_fatal() {
        let counter = Arc::new(AtomicUsize::new(0));
        let steps = vec![
            Step::new("broken", Operation::new(|_conn| Err(PipelineError::invalid_result(42)))),
            Step::new("after", counting(&counter)),
        ];

        let err = run(&steps, Conn::default()).unwrap_err();
        match err {
            PipelineError::InvalidOperationResult { plug, returned } => {
                assert_eq!(plug, "broken");
                assert_eq!(returned, "42");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_errors_propagate_unchanged() {
        let steps = vec![Step::new(
            "needs_user",
            Operation::new(|conn| {
                conn.fetch::<String>("user")?;
                Ok(conn)
            }),
        )];

        let err = run(&steps, Conn::default()).unwrap_err();
        assert!(matches!(err, PipelineError::KeyNotFound { key } if key == "user"));
    }

    #[test]
    fn test_later_steps_see_bag_writes() {
        let steps = vec![
            Step::new("store", Operation::infallible(|c| c.put("name", "Alice".to_string()))),
            Step::new(
                "read",
                Operation::new(|c| {
                    let greeting = format!("Hello, {}", c.fetch::<String>("name")?);
                    Ok(c.set_response_body(greeting))
                }),
            ),
        ];

        let conn = run(&steps, Conn::default()).unwrap();
        assert_eq!(conn.response_body(), ["Hello, Alice"]);
    }
}
