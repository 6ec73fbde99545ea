//! Workflows: ordered sequences of release steps.
//!
//! - [`step::WorkflowStep`]: one named, possibly failing, async operation
//! - [`Workflow`]: an ordered, cheaply clonable list of steps
//! - [`filter`]: pure functions producing narrowed copies of a workflow
//! - [`executor::WorkflowExecutor`]: runs a workflow against a context

pub mod executor;
pub mod filter;
pub mod step;

use std::fmt;
use std::sync::Arc;

pub use executor::WorkflowExecutor;
pub use filter::{filter_by_topology, first_mutating_step, without_interactive};
pub use step::{StepTraits, Topology, WorkflowStep};

/// An ordered sequence of steps representing one logical operation.
#[derive(Clone)]
pub struct Workflow {
    name: String,
    steps: Vec<Arc<dyn WorkflowStep>>,
}

impl Workflow {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step.
    pub fn step<S: WorkflowStep + 'static>(mut self, step: S) -> Self {
        self.steps.push(Arc::new(step));
        self
    }

    /// Append an already shared step.
    pub fn shared_step(mut self, step: Arc<dyn WorkflowStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[Arc<dyn WorkflowStep>] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Copy of this workflow keeping only steps matching `keep`, in order.
    pub(crate) fn retained<F>(&self, mut keep: F) -> Workflow
    where
        F: FnMut(&dyn WorkflowStep) -> bool,
    {
        Workflow {
            name: self.name.clone(),
            steps: self
                .steps
                .iter()
                .filter(|s| keep(s.as_ref()))
                .cloned()
                .collect(),
        }
    }
}

impl fmt::Debug for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workflow")
            .field("name", &self.name)
            .field("steps", &self.step_names())
            .finish()
    }
}
