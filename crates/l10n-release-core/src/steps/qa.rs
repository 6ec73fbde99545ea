//! QA bump steps run against the host repository.

use async_trait::async_trait;
use tracing::{info, warn};

use super::git;
use crate::context::{ReleaseContext, MANIFEST_FILE};
use crate::error::StepResult;
use crate::manifest::Manifest;
use crate::workflow::{StepTraits, WorkflowStep};

/// Points the host's declared dependency ranges at the freshly tagged versions.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateDependencies;

#[async_trait]
impl WorkflowStep for UpdateDependencies {
    fn name(&self) -> &str {
        "update dependencies"
    }

    fn traits(&self) -> StepTraits {
        StepTraits::new().mutating()
    }

    async fn run(&self, ctx: ReleaseContext) -> StepResult<ReleaseContext> {
        let mut manifest = Manifest::load(&ctx.manifest_path())?;
        let mut updated = 0usize;
        for dep in &ctx.dependencies {
            if manifest.update_dependency(&dep.pkg, &dep.version) {
                updated += 1;
            } else {
                warn!(repo = %ctx.repo, pkg = %dep.pkg, "dependency not declared, left alone");
            }
        }
        if updated > 0 {
            manifest.save()?;
        }
        info!(repo = %ctx.repo, updated, "dependencies updated");
        Ok(ctx)
    }
}

/// Commits the manifest with the change reason, unless nothing changed.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommitDependencies;

#[async_trait]
impl WorkflowStep for CommitDependencies {
    fn name(&self) -> &str {
        "commit dependencies"
    }

    fn traits(&self) -> StepTraits {
        StepTraits::new().mutating()
    }

    async fn run(&self, ctx: ReleaseContext) -> StepResult<ReleaseContext> {
        let git = git(&ctx);
        git.run(&["add", MANIFEST_FILE]).await?;

        // `diff --cached --quiet` exits non-zero when something is staged.
        if git.try_run(&["diff", "--cached", "--quiet"]).await?.is_some() {
            info!(repo = %ctx.repo, "no dependency changes to commit");
            return Ok(ctx);
        }

        let message = ctx
            .change_reason
            .clone()
            .unwrap_or_else(|| ctx.settings.release_name.clone());
        git.run(&["commit", "-m", &message]).await?;
        Ok(ctx)
    }
}

/// Pushes the host's current HEAD to its l10n branch on the remote.
#[derive(Debug, Clone, Copy, Default)]
pub struct PushBranch;

#[async_trait]
impl WorkflowStep for PushBranch {
    fn name(&self) -> &str {
        "push branch"
    }

    fn traits(&self) -> StepTraits {
        StepTraits::new().mutating()
    }

    async fn run(&self, ctx: ReleaseContext) -> StepResult<ReleaseContext> {
        let refspec = format!("HEAD:refs/heads/{}", ctx.branch);
        git(&ctx)
            .run(&["push", &ctx.settings.remote, &refspec])
            .await?;
        info!(repo = %ctx.repo, branch = %ctx.branch, "qa branch pushed");
        Ok(ctx)
    }
}
