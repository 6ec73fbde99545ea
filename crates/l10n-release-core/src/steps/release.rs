//! Pre-release steps: version bump, release commit, annotated tag and push.
//!
//! `PreviewLog`, `ShowDiff` and `MergeUpstreamDevelop` are interactive and are
//! stripped before the orchestrator runs the workflow unattended.

use async_trait::async_trait;
use tracing::info;

use super::{git, integration_ref};
use crate::context::ReleaseContext;
use crate::error::{StepError, StepResult};
use crate::manifest::Manifest;
use crate::version::{bump, parse_version, tag_for};
use crate::workflow::{StepTraits, WorkflowStep};

fn required_version(ctx: &ReleaseContext, step: &str) -> StepResult<String> {
    ctx.version
        .clone()
        .ok_or_else(|| StepError::Other(format!("{step}: no version was bumped for {}", ctx.repo)))
}

/// Logs the commits about to be released.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreviewLog;

#[async_trait]
impl WorkflowStep for PreviewLog {
    fn name(&self) -> &str {
        "preview log"
    }

    fn traits(&self) -> StepTraits {
        StepTraits::new().interactive()
    }

    async fn run(&self, ctx: ReleaseContext) -> StepResult<ReleaseContext> {
        let git = git(&ctx);
        let log = match git.latest_tag("HEAD").await? {
            Some(tag) => git.run(&["log", "--oneline", &format!("{tag}..HEAD")]).await?,
            None => git.run(&["log", "--oneline"]).await?,
        };
        info!(repo = %ctx.repo, "{log}");
        Ok(ctx)
    }
}

/// Logs a diffstat of the l10n branch against the integration branch.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShowDiff;

#[async_trait]
impl WorkflowStep for ShowDiff {
    fn name(&self) -> &str {
        "show diff"
    }

    fn traits(&self) -> StepTraits {
        StepTraits::new().interactive()
    }

    async fn run(&self, ctx: ReleaseContext) -> StepResult<ReleaseContext> {
        let base = integration_ref(&ctx);
        let stat = git(&ctx).run(&["diff", "--stat", &base, "HEAD"]).await?;
        info!(repo = %ctx.repo, "{stat}");
        Ok(ctx)
    }
}

/// Fast-forwards the l10n branch onto the remote develop branch.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeUpstreamDevelop;

#[async_trait]
impl WorkflowStep for MergeUpstreamDevelop {
    fn name(&self) -> &str {
        "merge upstream develop"
    }

    fn traits(&self) -> StepTraits {
        StepTraits::new().interactive().mutating().requires_develop()
    }

    async fn run(&self, ctx: ReleaseContext) -> StepResult<ReleaseContext> {
        let develop = format!("{}/develop", ctx.settings.remote);
        git(&ctx).run(&["merge", "--ff-only", &develop]).await?;
        Ok(ctx)
    }
}

/// Writes the next version to package.json.
#[derive(Debug, Clone, Copy, Default)]
pub struct BumpVersion;

#[async_trait]
impl WorkflowStep for BumpVersion {
    fn name(&self) -> &str {
        "bump version"
    }

    fn traits(&self) -> StepTraits {
        StepTraits::new().mutating()
    }

    async fn run(&self, ctx: ReleaseContext) -> StepResult<ReleaseContext> {
        let mut manifest = Manifest::load(&ctx.manifest_path())?;
        let current = parse_version(manifest.version()?)?;
        let next = bump(
            &current,
            ctx.settings.release_type,
            &ctx.settings.identifier,
        )?;
        manifest.set_version(&next.to_string());
        manifest.save()?;

        info!(repo = %ctx.repo, from = %current, to = %next, "version bumped");
        Ok(ctx.with_version(next.to_string()))
    }
}

/// Commits the manifest with the version as subject and the release name as body.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommitRelease;

#[async_trait]
impl WorkflowStep for CommitRelease {
    fn name(&self) -> &str {
        "commit release"
    }

    fn traits(&self) -> StepTraits {
        StepTraits::new().mutating()
    }

    async fn run(&self, ctx: ReleaseContext) -> StepResult<ReleaseContext> {
        let version = required_version(&ctx, self.name())?;
        let git = git(&ctx);
        git.run(&["add", crate::context::MANIFEST_FILE]).await?;
        git.run(&["commit", "-m", &version, "-m", &ctx.settings.release_name])
            .await?;
        Ok(ctx)
    }
}

/// Creates the annotated `v<version>` tag and records it on the context.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagRelease;

#[async_trait]
impl WorkflowStep for TagRelease {
    fn name(&self) -> &str {
        "tag release"
    }

    fn traits(&self) -> StepTraits {
        StepTraits::new().mutating()
    }

    async fn run(&self, ctx: ReleaseContext) -> StepResult<ReleaseContext> {
        let version = parse_version(&required_version(&ctx, self.name())?)?;
        let tag = tag_for(&version);
        git(&ctx)
            .run(&["tag", "-a", &tag, "-m", &ctx.settings.release_name])
            .await?;
        Ok(ctx.with_tag(tag))
    }
}

/// Pushes the l10n branch and the release tag to the remote.
#[derive(Debug, Clone, Copy, Default)]
pub struct PushRelease;

#[async_trait]
impl WorkflowStep for PushRelease {
    fn name(&self) -> &str {
        "push release"
    }

    fn traits(&self) -> StepTraits {
        StepTraits::new().mutating()
    }

    async fn run(&self, ctx: ReleaseContext) -> StepResult<ReleaseContext> {
        let tag = ctx
            .tag
            .clone()
            .ok_or_else(|| StepError::Other(format!("push release: {} has no tag", ctx.repo)))?;
        let branch = format!("HEAD:refs/heads/{}", ctx.branch);
        let tag_ref = format!("refs/tags/{tag}");
        git(&ctx)
            .run(&["push", &ctx.settings.remote, &branch, &tag_ref])
            .await?;
        info!(repo = %ctx.repo, tag = %tag, "release pushed");
        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::Topology;

    #[test]
    fn test_interactive_steps() {
        assert!(PreviewLog.traits().interactive);
        assert!(ShowDiff.traits().interactive);
        let merge = MergeUpstreamDevelop.traits();
        assert!(merge.interactive);
        assert_eq!(merge.topology, Topology::RequiresDevelop);
        assert!(!BumpVersion.traits().interactive);
    }

    #[tokio::test]
    async fn test_tag_requires_bumped_version() {
        let ctx = crate::fakes::fake_context("core-ui");
        let err = TagRelease.run(ctx).await.unwrap_err();
        assert!(err.to_string().contains("no version was bumped for core-ui"));
    }

    #[tokio::test]
    async fn test_push_requires_tag() {
        let ctx = crate::fakes::fake_context("core-ui");
        let err = PushRelease.run(ctx).await.unwrap_err();
        assert!(err.to_string().contains("core-ui has no tag"));
    }
}
