//! Workflow step contract and declarative capabilities.

use async_trait::async_trait;

use crate::context::{BranchTopology, ReleaseContext};
use crate::error::StepResult;

/// Branch structure a step depends on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Topology {
    /// Applies regardless of branch structure.
    #[default]
    Any,
    /// Only applies when the remote has a `develop` branch.
    RequiresDevelop,
    /// Only applies when the remote has no `develop` branch.
    RequiresNoDevelop,
}

impl Topology {
    pub fn applies_to(&self, topology: &BranchTopology) -> bool {
        match self {
            Topology::Any => true,
            Topology::RequiresDevelop => topology.has_develop,
            Topology::RequiresNoDevelop => !topology.has_develop,
        }
    }
}

/// Capabilities a step declares so filters never compare step identities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepTraits {
    /// Meant for a human to confirm (previews, diffs, manual merges).
    pub interactive: bool,
    /// Changes local or remote repository state.
    pub mutating: bool,
    pub topology: Topology,
}

impl StepTraits {
    pub const fn new() -> Self {
        Self {
            interactive: false,
            mutating: false,
            topology: Topology::Any,
        }
    }

    pub const fn interactive(mut self) -> Self {
        self.interactive = true;
        self
    }

    pub const fn mutating(mut self) -> Self {
        self.mutating = true;
        self
    }

    pub const fn requires_develop(mut self) -> Self {
        self.topology = Topology::RequiresDevelop;
        self
    }

    pub const fn requires_no_develop(mut self) -> Self {
        self.topology = Topology::RequiresNoDevelop;
        self
    }
}

/// A named operation over a [`ReleaseContext`].
///
/// Steps receive the context by value and return the next one. A step that
/// sets a short-circuiting status (see
/// [`ReleaseStatus::short_circuits`](crate::context::ReleaseStatus::short_circuits))
/// ends the workflow for that repository.
#[async_trait]
pub trait WorkflowStep: Send + Sync {
    fn name(&self) -> &str;

    fn traits(&self) -> StepTraits {
        StepTraits::new()
    }

    async fn run(&self, ctx: ReleaseContext) -> StepResult<ReleaseContext>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topology_applies() {
        let with = BranchTopology { has_develop: true };
        let without = BranchTopology { has_develop: false };
        assert!(Topology::Any.applies_to(&with));
        assert!(Topology::Any.applies_to(&without));
        assert!(Topology::RequiresDevelop.applies_to(&with));
        assert!(!Topology::RequiresDevelop.applies_to(&without));
        assert!(Topology::RequiresNoDevelop.applies_to(&without));
        assert!(!Topology::RequiresNoDevelop.applies_to(&with));
    }

    #[test]
    fn test_traits_builder() {
        let traits = StepTraits::new().interactive().requires_develop();
        assert!(traits.interactive);
        assert!(!traits.mutating);
        assert_eq!(traits.topology, Topology::RequiresDevelop);
        assert_eq!(StepTraits::default(), StepTraits::new());
    }
}
