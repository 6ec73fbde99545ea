//! Repository facts the orchestrator needs before choosing a workflow.

use std::path::Path;

use async_trait::async_trait;

use crate::error::StepResult;
use crate::git::Git;
use crate::manifest::Manifest;

/// Answers branch-topology and visibility questions about a repository.
#[async_trait]
pub trait RepoProbe: Send + Sync {
    /// Whether the remote carries a `develop` branch.
    async fn has_develop_branch(&self, cwd: &Path) -> StepResult<bool>;

    /// Whether the manifest at `manifest` is marked `"private": true`.
    fn is_package_private(&self, manifest: &Path) -> StepResult<bool>;
}

/// Probe backed by the system `git` binary and the repository's package.json.
#[derive(Debug, Clone)]
pub struct GitProbe {
    remote: String,
    max_buffer: usize,
}

impl GitProbe {
    pub fn new(remote: impl Into<String>, max_buffer: usize) -> Self {
        Self {
            remote: remote.into(),
            max_buffer,
        }
    }
}

#[async_trait]
impl RepoProbe for GitProbe {
    async fn has_develop_branch(&self, cwd: &Path) -> StepResult<bool> {
        Git::new(cwd, self.max_buffer)
            .remote_branch_exists(&self.remote, "develop")
            .await
    }

    fn is_package_private(&self, manifest: &Path) -> StepResult<bool> {
        Ok(Manifest::load(manifest)?.is_private())
    }
}
