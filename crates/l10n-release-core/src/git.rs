//! Thin async wrapper around the system `git` binary.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::{StepError, StepResult};

/// Runs git commands inside one working directory.
#[derive(Debug, Clone)]
pub struct Git {
    cwd: PathBuf,
    max_buffer: usize,
}

impl Git {
    pub fn new(cwd: impl AsRef<Path>, max_buffer: usize) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            max_buffer,
        }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Run `git <args>` and return its trimmed stdout. Non-zero exit is an error.
    pub async fn run(&self, args: &[&str]) -> StepResult<String> {
        match self.output(args).await? {
            (true, stdout, _) => Ok(stdout),
            (false, _, stderr) => Err(StepError::Git {
                command: args.join(" "),
                stderr,
            }),
        }
    }

    /// Run `git <args>`, returning `None` instead of an error on non-zero exit.
    pub async fn try_run(&self, args: &[&str]) -> StepResult<Option<String>> {
        match self.output(args).await? {
            (true, stdout, _) => Ok(Some(stdout)),
            (false, _, _) => Ok(None),
        }
    }

    async fn output(&self, args: &[&str]) -> StepResult<(bool, String, String)> {
        debug!(cwd = %self.cwd.display(), command = %args.join(" "), "git");

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if output.stdout.len() > self.max_buffer {
            return Err(StepError::OutputTooLarge {
                command: args.join(" "),
                limit: self.max_buffer,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Ok((output.status.success(), stdout, stderr))
    }

    pub async fn fetch(&self, remote: &str) -> StepResult<()> {
        self.run(&["fetch", "--tags", "--prune", remote]).await.map(drop)
    }

    /// Whether `refs/heads/<branch>` exists on `remote`.
    pub async fn remote_branch_exists(&self, remote: &str, branch: &str) -> StepResult<bool> {
        let pattern = format!("refs/heads/{branch}");
        let out = self.run(&["ls-remote", "--heads", remote, &pattern]).await?;
        Ok(!out.trim().is_empty())
    }

    /// Most recent tag reachable from `reference`, if any.
    pub async fn latest_tag(&self, reference: &str) -> StepResult<Option<String>> {
        let out = self
            .try_run(&["describe", "--tags", "--abbrev=0", reference])
            .await?;
        Ok(out.filter(|tag| !tag.is_empty()))
    }

    /// Number of commits in `range` (e.g. `v1.0.0..upstream/develop`).
    pub async fn commit_count(&self, range: &str) -> StepResult<u32> {
        let out = self.run(&["rev-list", "--count", range]).await?;
        out.trim().parse::<u32>().map_err(|e| StepError::Git {
            command: format!("rev-list --count {range}"),
            stderr: format!("unexpected output {out:?}: {e}"),
        })
    }

    /// Paths changed between two references.
    pub async fn changed_files(&self, from: &str, to: &str) -> StepResult<Vec<String>> {
        let out = self.run(&["diff", "--name-only", from, to]).await?;
        Ok(lines(&out))
    }

    /// Every path tracked at `reference`.
    pub async fn tracked_files(&self, reference: &str) -> StepResult<Vec<String>> {
        let out = self.run(&["ls-tree", "-r", "--name-only", reference]).await?;
        Ok(lines(&out))
    }
}

fn lines(out: &str) -> Vec<String> {
    out.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command as StdCommand;

    fn run_git(dir: &Path, args: &[&str]) {
        let output = StdCommand::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }

    fn make_git_repo() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        run_git(dir.path(), &["init"]);
        run_git(dir.path(), &["config", "user.name", "test-user"]);
        run_git(dir.path(), &["config", "user.email", "test@example.com"]);
        run_git(dir.path(), &["config", "commit.gpgsign", "false"]);
        run_git(dir.path(), &["commit", "--allow-empty", "-m", "initial"]);
        dir
    }

    #[tokio::test]
    async fn run_returns_trimmed_stdout() {
        let repo = make_git_repo();
        let git = Git::new(repo.path(), 1024 * 1024);
        let count = git.run(&["rev-list", "--count", "HEAD"]).await.unwrap();
        assert_eq!(count, "1");
        assert_eq!(git.commit_count("HEAD").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn run_fails_outside_repo() {
        let dir = tempfile::tempdir().unwrap();
        let git = Git::new(dir.path(), 1024);
        let err = git.run(&["rev-parse", "HEAD"]).await.unwrap_err();
        assert!(matches!(err, StepError::Git { ref command, .. } if command == "rev-parse HEAD"));
    }

    #[tokio::test]
    async fn try_run_maps_failure_to_none() {
        let repo = make_git_repo();
        let git = Git::new(repo.path(), 1024);
        assert_eq!(git.latest_tag("HEAD").await.unwrap(), None);
    }

    #[tokio::test]
    async fn output_over_max_buffer_is_rejected() {
        let repo = make_git_repo();
        let git = Git::new(repo.path(), 4);
        let err = git.run(&["rev-parse", "HEAD"]).await.unwrap_err();
        assert!(matches!(err, StepError::OutputTooLarge { limit: 4, .. }));
    }

    #[tokio::test]
    async fn latest_tag_finds_reachable_tag() {
        let repo = make_git_repo();
        run_git(repo.path(), &["tag", "v1.0.0"]);
        run_git(repo.path(), &["commit", "--allow-empty", "-m", "after"]);
        let git = Git::new(repo.path(), 1024 * 1024);
        assert_eq!(git.latest_tag("HEAD").await.unwrap().as_deref(), Some("v1.0.0"));
        assert_eq!(git.commit_count("v1.0.0..HEAD").await.unwrap(), 1);
    }
}
