//! Pure workflow filters.
//!
//! Each filter returns a new [`Workflow`]; inputs are never modified, and
//! steps that survive keep their relative order.

use crate::context::ReleaseContext;
use crate::workflow::Workflow;

/// Drop steps whose declared topology does not match the repository's branches.
pub fn filter_by_topology(ctx: &ReleaseContext, workflow: &Workflow) -> Workflow {
    workflow.retained(|step| step.traits().topology.applies_to(&ctx.topology))
}

/// Drop steps meant for interactive confirmation.
pub fn without_interactive(workflow: &Workflow) -> Workflow {
    workflow.retained(|step| !step.traits().interactive)
}

/// Name of the first step that changes repository state, if any.
pub fn first_mutating_step(workflow: &Workflow) -> Option<&str> {
    workflow
        .steps()
        .iter()
        .find(|step| step.traits().mutating)
        .map(|step| step.name())
}
