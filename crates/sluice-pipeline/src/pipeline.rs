//! Resolved, immutable pipelines.

use crate::compose::{self, Step};
use sluice_core::{Conn, Operation, PipelineResult};
use std::fmt;
use std::sync::Arc;

/// An ordered, frozen list of resolved steps.
///
/// A pipeline is built once and then shared by every request. Cloning is
/// cheap: the steps live behind an `Arc`.
#[derive(Clone)]
pub struct Pipeline {
    steps: Arc<[Step]>,
}

impl Pipeline {
    /// Creates a pipeline from resolved steps.
    #[must_use]
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: steps.into(),
        }
    }

    /// Creates a pipeline without steps. Calling it returns the input.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Runs the pipeline over `conn`.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a step.
    pub fn call(&self, conn: Conn) -> PipelineResult<Conn> {
        compose::run(&self.steps, conn)
    }

    /// Wraps the whole pipeline as a single [`Operation`].
    #[must_use]
    pub fn to_operation(&self) -> Operation {
        let pipeline = self.clone();
        Operation::new(move |conn| pipeline.call(conn))
    }

    /// Returns the resolved steps.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Returns the plug names, in execution order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(Step::name)
    }

    /// Returns the number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` if the pipeline has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("plugs", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pipeline_is_identity() {
        let pipeline = Pipeline::empty();
        assert!(pipeline.is_empty());

        let conn = pipeline.call(Conn::default().set_status(418)).unwrap();
        assert_eq!(conn.status(), Some(418));
    }

    #[test]
    fn test_to_operation() {
        let pipeline = Pipeline::new(vec![
            Step::new("a", Operation::infallible(|c| c.put("a", 1_u8))),
            Step::new("b", Operation::infallible(|c| c.put("b", 2_u8))),
        ]);

        let conn = pipeline.to_operation().call(Conn::default()).unwrap();
        assert_eq!(conn.fetch::<u8>("a").copied().unwrap(), 1);
        assert_eq!(conn.fetch::<u8>("b").copied().unwrap(), 2);
    }

    #[test]
    fn test_debug_lists_plugs() {
        let pipeline = Pipeline::new(vec![Step::new("auth", Operation::identity())]);
        assert_eq!(format!("{pipeline:?}"), r#"Pipeline { plugs: ["auth"] }"#);
    }
}
