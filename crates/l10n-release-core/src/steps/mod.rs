//! Git-backed workflow steps and the default workflows built from them.
//!
//! Every step shells out to the system `git` binary inside the repository's
//! working directory, bounded by the run's `max_buffer`.

pub mod qa;
pub mod release;
pub mod sync;

pub use qa::{CommitDependencies, PushBranch, UpdateDependencies};
pub use release::{
    BumpVersion, CommitRelease, MergeUpstreamDevelop, PreviewLog, PushRelease, ShowDiff,
    TagRelease,
};
pub use sync::{is_locale_path, CheckoutL10nBranch, DetectChanges, FetchRemote, ResetBranch};

use crate::context::ReleaseContext;
use crate::git::Git;
use crate::orchestrator::Workflows;
use crate::workflow::Workflow;

fn git(ctx: &ReleaseContext) -> Git {
    Git::new(&ctx.cwd, ctx.settings.max_buffer)
}

/// Remote-tracking ref of the branch ongoing work lands on.
fn integration_ref(ctx: &ReleaseContext) -> String {
    format!(
        "{}/{}",
        ctx.settings.remote,
        ctx.topology.integration_branch()
    )
}

pub fn sync_workflow() -> Workflow {
    Workflow::new("sync")
        .step(FetchRemote)
        .step(ResetBranch::master())
        .step(ResetBranch::develop())
        .step(DetectChanges)
}

/// Read-only change detection.
pub fn check_workflow() -> Workflow {
    Workflow::new("check").step(FetchRemote).step(DetectChanges)
}

pub fn checkout_workflow() -> Workflow {
    Workflow::new("checkout").step(CheckoutL10nBranch)
}

pub fn pre_release_workflow() -> Workflow {
    Workflow::new("pre-release")
        .step(PreviewLog)
        .step(ShowDiff)
        .step(MergeUpstreamDevelop)
        .step(BumpVersion)
        .step(CommitRelease)
        .step(TagRelease)
        .step(PushRelease)
}

pub fn qa_bump_workflow() -> Workflow {
    Workflow::new("qa-bump")
        .step(UpdateDependencies)
        .step(CommitDependencies)
        .step(PushBranch)
}

/// The full set of git-backed workflows the CLI runs with.
pub fn default_workflows() -> Workflows {
    Workflows {
        sync: sync_workflow(),
        check: check_workflow(),
        checkout: checkout_workflow(),
        pre_release: pre_release_workflow(),
        qa_bump: qa_bump_workflow(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{first_mutating_step, without_interactive};

    #[test]
    fn test_check_workflow_is_read_only() {
        assert_eq!(first_mutating_step(&check_workflow()), None);
    }

    #[test]
    fn test_sync_workflow_mutates() {
        assert_eq!(first_mutating_step(&sync_workflow()), Some("reset master"));
    }

    #[test]
    fn test_unattended_pre_release() {
        let flow = without_interactive(&pre_release_workflow());
        assert_eq!(
            flow.step_names(),
            vec!["bump version", "commit release", "tag release", "push release"]
        );
    }

    #[test]
    fn test_default_workflow_names() {
        let workflows = default_workflows();
        assert_eq!(workflows.sync.name(), "sync");
        assert_eq!(workflows.check.name(), "check");
        assert_eq!(workflows.checkout.name(), "checkout");
        assert_eq!(workflows.pre_release.name(), "pre-release");
        assert_eq!(workflows.qa_bump.name(), "qa-bump");
        assert_eq!(workflows.qa_bump.len(), 3);
    }

    #[test]
    fn test_integration_ref_follows_topology() {
        let mut ctx = crate::fakes::fake_context("core-ui");
        assert_eq!(integration_ref(&ctx), "upstream/master");
        ctx.topology.has_develop = true;
        assert_eq!(integration_ref(&ctx), "upstream/develop");
    }
}
