//! In-memory fakes for the orchestrator's collaborators (testing only)
//!
//! Provides `FakeStep`, `FakeProbe` and `RecordingProgress` that satisfy the
//! trait contracts without touching git or the filesystem.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::{ReleaseSettings, RepositoryEntry};
use crate::context::{BranchTopology, ReleaseContext};
use crate::error::{StepError, StepResult};
use crate::probe::RepoProbe;
use crate::progress::{Progress, ProgressFactory};
use crate::workflow::{StepTraits, WorkflowStep};

/// Context for `repo` rooted at `/fleet`, non-host, without develop branch.
pub fn fake_context(repo: &str) -> ReleaseContext {
    let entry = RepositoryEntry {
        repo: repo.to_string(),
        branch: "feature-l10n".to_string(),
        host: false,
    };
    ReleaseContext::for_entry(
        &entry,
        Path::new("/fleet"),
        Arc::new(ReleaseSettings::default()),
        BranchTopology::default(),
    )
}

// ---------------------------------------------------------------------------
// StepLog / FakeStep
// ---------------------------------------------------------------------------

/// Shared, ordered log of `(repo, step)` invocations.
#[derive(Debug, Clone, Default)]
pub struct StepLog {
    entries: Arc<Mutex<Vec<(String, String)>>>,
}

impl StepLog {
    pub fn record(&self, repo: &str, step: &str) {
        self.entries
            .lock()
            .unwrap()
            .push((repo.to_string(), step.to_string()));
    }

    pub fn entries(&self) -> Vec<(String, String)> {
        self.entries.lock().unwrap().clone()
    }

    /// Steps run for `repo`, in order.
    pub fn steps_for(&self, repo: &str) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, _)| r == repo)
            .map(|(_, s)| s.clone())
            .collect()
    }

    /// Repositories a step named `step` ran for, in order.
    pub fn repos_for(&self, step: &str) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, s)| s == step)
            .map(|(r, _)| r.clone())
            .collect()
    }
}

type StepAction = Arc<dyn Fn(ReleaseContext) -> StepResult<ReleaseContext> + Send + Sync>;

/// Step that logs its invocation and applies a scripted action.
#[derive(Clone)]
pub struct FakeStep {
    name: String,
    traits: StepTraits,
    log: StepLog,
    action: StepAction,
}

impl FakeStep {
    pub fn new(name: &str, log: &StepLog) -> Self {
        Self {
            name: name.to_string(),
            traits: StepTraits::new(),
            log: log.clone(),
            action: Arc::new(Ok::<ReleaseContext, StepError>),
        }
    }

    pub fn with_traits(mut self, traits: StepTraits) -> Self {
        self.traits = traits;
        self
    }

    pub fn with_action<F>(mut self, action: F) -> Self
    where
        F: Fn(ReleaseContext) -> StepResult<ReleaseContext> + Send + Sync + 'static,
    {
        self.action = Arc::new(action);
        self
    }

    /// Fails with `reason` when run for `repo`, otherwise passes through.
    pub fn failing_for(name: &str, log: &StepLog, repo: &str, reason: &str) -> Self {
        let repo = repo.to_string();
        let reason = reason.to_string();
        Self::new(name, log).with_action(move |ctx| {
            if ctx.repo == repo {
                Err(StepError::Other(reason.clone()))
            } else {
                Ok(ctx)
            }
        })
    }
}

#[async_trait]
impl WorkflowStep for FakeStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn traits(&self) -> StepTraits {
        self.traits
    }

    async fn run(&self, ctx: ReleaseContext) -> StepResult<ReleaseContext> {
        self.log.record(&ctx.repo, &self.name);
        (self.action)(ctx)
    }
}

// ---------------------------------------------------------------------------
// FakeProbe
// ---------------------------------------------------------------------------

/// Probe answering from fixed sets of repository names.
///
/// Visibility is looked up by the manifest's parent directory name.
#[derive(Debug, Clone, Default)]
pub struct FakeProbe {
    develop: HashSet<String>,
    private: HashSet<String>,
    failing: HashSet<String>,
    visibility_checks: Arc<Mutex<Vec<String>>>,
}

impl FakeProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_develop(mut self, repo: &str) -> Self {
        self.develop.insert(repo.to_string());
        self
    }

    pub fn with_private(mut self, repo: &str) -> Self {
        self.private.insert(repo.to_string());
        self
    }

    /// Make every probe of `repo` fail.
    pub fn with_failure(mut self, repo: &str) -> Self {
        self.failing.insert(repo.to_string());
        self
    }

    /// Repositories whose visibility was checked, in order.
    pub fn visibility_checks(&self) -> Vec<String> {
        self.visibility_checks.lock().unwrap().clone()
    }

    fn check(&self, repo: &str) -> StepResult<()> {
        if self.failing.contains(repo) {
            return Err(StepError::Other(format!("probe failed for {repo}")));
        }
        Ok(())
    }
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[async_trait]
impl RepoProbe for FakeProbe {
    async fn has_develop_branch(&self, cwd: &Path) -> StepResult<bool> {
        let repo = dir_name(cwd);
        self.check(&repo)?;
        Ok(self.develop.contains(&repo))
    }

    fn is_package_private(&self, manifest: &Path) -> StepResult<bool> {
        let repo = manifest.parent().map(dir_name).unwrap_or_default();
        self.check(&repo)?;
        self.visibility_checks.lock().unwrap().push(repo.clone());
        Ok(self.private.contains(&repo))
    }
}

// ---------------------------------------------------------------------------
// RecordingProgress
// ---------------------------------------------------------------------------

/// Progress factory recording `start:<label>`, `succeed:<label>` and
/// `fail:<label>` events.
#[derive(Debug, Clone, Default)]
pub struct RecordingProgress {
    events: Arc<Mutex<Vec<String>>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

struct RecordingIndicator {
    label: String,
    events: Arc<Mutex<Vec<String>>>,
}

impl RecordingIndicator {
    fn push(&self, kind: &str) {
        self.events
            .lock()
            .unwrap()
            .push(format!("{kind}:{}", self.label));
    }
}

impl Progress for RecordingIndicator {
    fn start(&mut self) {
        self.push("start");
    }

    fn succeed(&mut self) {
        self.push("succeed");
    }

    fn fail(&mut self) {
        self.push("fail");
    }
}

impl ProgressFactory for RecordingProgress {
    fn create(&self, label: &str) -> Box<dyn Progress> {
        Box::new(RecordingIndicator {
            label: label.to_string(),
            events: Arc::clone(&self.events),
        })
    }
}
