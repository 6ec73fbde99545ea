//! Sync, change detection and l10n branch checkout.

use async_trait::async_trait;
use tracing::{debug, info};

use super::{git, integration_ref};
use crate::context::{Changes, ReleaseContext, ReleaseStatus};
use crate::error::StepResult;
use crate::workflow::{StepTraits, WorkflowStep};

/// `git fetch --tags --prune <remote>`. Only touches remote-tracking refs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchRemote;

#[async_trait]
impl WorkflowStep for FetchRemote {
    fn name(&self) -> &str {
        "fetch remote"
    }

    async fn run(&self, ctx: ReleaseContext) -> StepResult<ReleaseContext> {
        git(&ctx).fetch(&ctx.settings.remote).await?;
        Ok(ctx)
    }
}

/// Points a local branch at its remote counterpart, discarding local commits.
#[derive(Debug, Clone)]
pub struct ResetBranch {
    branch: &'static str,
    name: String,
    traits: StepTraits,
}

impl ResetBranch {
    pub fn master() -> Self {
        Self {
            branch: "master",
            name: "reset master".to_string(),
            traits: StepTraits::new().mutating(),
        }
    }

    pub fn develop() -> Self {
        Self {
            branch: "develop",
            name: "reset develop".to_string(),
            traits: StepTraits::new().mutating().requires_develop(),
        }
    }
}

#[async_trait]
impl WorkflowStep for ResetBranch {
    fn name(&self) -> &str {
        &self.name
    }

    fn traits(&self) -> StepTraits {
        self.traits
    }

    async fn run(&self, ctx: ReleaseContext) -> StepResult<ReleaseContext> {
        let upstream = format!("{}/{}", ctx.settings.remote, self.branch);
        git(&ctx)
            .run(&["checkout", "-B", self.branch, &upstream])
            .await?;
        Ok(ctx)
    }
}

/// Whether any segment of `path` names a localisation directory.
pub fn is_locale_path(path: &str, locale_paths: &[String]) -> bool {
    path.split('/')
        .any(|segment| locale_paths.iter().any(|l| l == segment))
}

/// Classifies what changed on the integration branch since the last tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetectChanges;

#[async_trait]
impl WorkflowStep for DetectChanges {
    fn name(&self) -> &str {
        "detect changes"
    }

    async fn run(&self, ctx: ReleaseContext) -> StepResult<ReleaseContext> {
        let git = git(&ctx);
        let head = integration_ref(&ctx);

        let (files, diff) = match git.latest_tag(&head).await? {
            Some(tag) => (
                git.changed_files(&tag, &head).await?,
                git.commit_count(&format!("{tag}..{head}")).await?,
            ),
            None => (git.tracked_files(&head).await?, git.commit_count(&head).await?),
        };

        let mut changes = Changes {
            diff,
            ..Changes::default()
        };
        for file in &files {
            if is_locale_path(file, &ctx.settings.locale_paths) {
                changes.locale = true;
            } else {
                changes.dev = true;
            }
        }

        debug!(
            repo = %ctx.repo,
            files = files.len(),
            locale = changes.locale,
            dev = changes.dev,
            diff,
            "changes detected"
        );
        Ok(ctx.with_changes(changes))
    }
}

/// Creates the l10n branch from the integration branch.
///
/// Marks the repository skipped when the branch already exists on the
/// remote: a previous run left it for review.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckoutL10nBranch;

#[async_trait]
impl WorkflowStep for CheckoutL10nBranch {
    fn name(&self) -> &str {
        "checkout l10n branch"
    }

    fn traits(&self) -> StepTraits {
        StepTraits::new().mutating()
    }

    async fn run(&self, ctx: ReleaseContext) -> StepResult<ReleaseContext> {
        let git = git(&ctx);
        if git
            .remote_branch_exists(&ctx.settings.remote, &ctx.branch)
            .await?
        {
            info!(repo = %ctx.repo, branch = %ctx.branch, "l10n branch exists on remote");
            return Ok(ctx.with_status(ReleaseStatus::Skipped));
        }

        let start = integration_ref(&ctx);
        git.run(&["checkout", "-B", &ctx.branch, &start]).await?;
        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locale_paths() -> Vec<String> {
        vec!["locale".to_string(), "nls".to_string(), "i18n".to_string()]
    }

    #[test]
    fn test_locale_path_matches_any_segment() {
        let paths = locale_paths();
        assert!(is_locale_path("locale/fr/messages.json", &paths));
        assert!(is_locale_path("src/components/nls/de.properties", &paths));
        assert!(is_locale_path("i18n", &paths));
    }

    #[test]
    fn test_locale_path_requires_whole_segment() {
        let paths = locale_paths();
        assert!(!is_locale_path("src/localeUtils.js", &paths));
        assert!(!is_locale_path("package.json", &paths));
        assert!(!is_locale_path("docs/i18n.md", &paths));
    }

    #[test]
    fn test_step_traits() {
        assert!(!FetchRemote.traits().mutating);
        assert!(!DetectChanges.traits().mutating);
        assert!(CheckoutL10nBranch.traits().mutating);
        assert_eq!(
            ResetBranch::develop().traits().topology,
            crate::workflow::Topology::RequiresDevelop
        );
    }
}
