//! Repository orchestrator: drives one workflow per repository, in
//! configuration order, then decides and drives the QA bump.
//!
//! Two mutually exclusive modes share the same shape:
//!
//! - [`RunMode::Live`]: sync, change detection, l10n branch checkout,
//!   visibility check, unattended pre-release, and finally the QA bump of the
//!   first host repository.
//! - [`RunMode::Check`]: runs only the read-only check workflow and records
//!   whether each repository has pending changes.
//!
//! Repositories are processed strictly one at a time. A failing workflow
//! aborts the whole run; the accumulator is left holding only the
//! repositories that finished.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::accumulator::{OutcomeRecord, ResultAccumulator};
use crate::config::{ReleaseConfig, ReleaseSettings, RepositoryEntry};
use crate::context::{BranchTopology, ReleaseContext, ReleaseStatus};
use crate::error::{Phase, ReleaseError, ReleaseResult};
use crate::probe::RepoProbe;
use crate::progress::ProgressFactory;
use crate::qa_bump::{plan_qa_bump, QaBumpPlan};
use crate::workflow::{
    filter_by_topology, first_mutating_step, without_interactive, Workflow, WorkflowExecutor,
};

/// The workflows the orchestrator sequences. Supplied by the caller.
#[derive(Debug, Clone)]
pub struct Workflows {
    /// Brings a repository up to date and detects changes (live mode).
    pub sync: Workflow,
    /// Read-only change detection (check mode).
    pub check: Workflow,
    /// Creates the l10n branch; may mark the repository skipped.
    pub checkout: Workflow,
    /// Generic pre-release; interactive steps are stripped before running.
    pub pre_release: Workflow,
    /// Dependency bump of the host repository.
    pub qa_bump: Workflow,
}

/// Selected once per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Live,
    Check,
}

/// Result of a fully completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub mode: RunMode,
    pub outcomes: ResultAccumulator,
    /// Set when the QA bump ran.
    pub qa_bump: Option<QaBumpPlan>,
}

/// Drives a release run across the configured repositories.
pub struct Orchestrator {
    root: PathBuf,
    repositories: Vec<RepositoryEntry>,
    settings: Arc<ReleaseSettings>,
    workflows: Workflows,
    probe: Arc<dyn RepoProbe>,
    progress: Arc<dyn ProgressFactory>,
}

impl Orchestrator {
    pub fn new(
        config: ReleaseConfig,
        settings: ReleaseSettings,
        workflows: Workflows,
        probe: Arc<dyn RepoProbe>,
        progress: Arc<dyn ProgressFactory>,
    ) -> Self {
        Self {
            root: config.root_directory,
            repositories: config.repositories,
            settings: Arc::new(settings),
            workflows,
            probe,
            progress,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn repositories(&self) -> &[RepositoryEntry] {
        &self.repositories
    }

    /// Run every repository in `mode` to completion or first failure.
    #[instrument(skip(self), fields(run_id = %Uuid::new_v4(), repositories = self.repositories.len()))]
    pub async fn run(&self, mode: RunMode) -> ReleaseResult<RunReport> {
        match mode {
            RunMode::Live => self.run_live().await,
            RunMode::Check => self.run_check().await,
        }
    }

    /// Live release of every repository followed by the QA bump decision.
    pub async fn run_live(&self) -> ReleaseResult<RunReport> {
        let mut outcomes = ResultAccumulator::new();

        for entry in &self.repositories {
            let mut progress = self.progress.create(&entry.repo);
            progress.start();
            match self.process_live(entry).await {
                Ok(ctx) => {
                    info!(repo = %ctx.repo, status = %ctx.status, tag = ?ctx.tag, "repository finished");
                    outcomes.record(OutcomeRecord::from_context(&ctx));
                    progress.succeed();
                }
                Err(err) => {
                    progress.fail();
                    return Err(err);
                }
            }
        }

        let qa_bump = self.run_qa_bump(&mut outcomes).await?;

        Ok(RunReport {
            mode: RunMode::Live,
            outcomes,
            qa_bump,
        })
    }

    /// Read-only pass recording pending changes; never checks out, tags or pushes.
    pub async fn run_check(&self) -> ReleaseResult<RunReport> {
        if let Some(step) = first_mutating_step(&self.workflows.check) {
            return Err(ReleaseError::MutatingCheckStep {
                step: step.to_string(),
            });
        }

        let mut outcomes = ResultAccumulator::new();

        for entry in &self.repositories {
            let mut progress = self.progress.create(&entry.repo);
            progress.start();
            match self.process_check(entry).await {
                Ok(ctx) => {
                    info!(repo = %ctx.repo, status = %ctx.status, diff = ctx.changes.diff, "repository checked");
                    outcomes.record(OutcomeRecord::from_context(&ctx));
                    progress.succeed();
                }
                Err(err) => {
                    progress.fail();
                    return Err(err);
                }
            }
        }

        Ok(RunReport {
            mode: RunMode::Check,
            outcomes,
            qa_bump: None,
        })
    }

    #[instrument(skip_all, fields(repo = %entry.repo))]
    async fn process_live(&self, entry: &RepositoryEntry) -> ReleaseResult<ReleaseContext> {
        let ctx = self.prepare(entry, Phase::Sync).await?;
        let sync = filter_by_topology(&ctx, &self.workflows.sync);
        let ctx = self.execute(&sync, ctx, Phase::Sync).await?;
        self.release_repository(ctx).await
    }

    #[instrument(skip_all, fields(repo = %entry.repo))]
    async fn process_check(&self, entry: &RepositoryEntry) -> ReleaseResult<ReleaseContext> {
        let ctx = self.prepare(entry, Phase::Check).await?;
        let ctx = self.execute(&self.workflows.check, ctx, Phase::Check).await?;
        let status = if ctx.changes.any() {
            ReleaseStatus::Changes
        } else {
            ReleaseStatus::NoChanges
        };
        Ok(ctx.with_status(status))
    }

    /// Fresh context for `entry`, with its branch topology probed.
    async fn prepare(&self, entry: &RepositoryEntry, phase: Phase) -> ReleaseResult<ReleaseContext> {
        let cwd = self.root.join(&entry.repo);
        let has_develop =
            self.probe
                .has_develop_branch(&cwd)
                .await
                .map_err(|source| ReleaseError::Probe {
                    repo: entry.repo.clone(),
                    phase,
                    source,
                })?;
        Ok(ReleaseContext::for_entry(
            entry,
            &self.root,
            Arc::clone(&self.settings),
            BranchTopology { has_develop },
        ))
    }

    /// Change detection, checkout, visibility check and release for one
    /// synced repository.
    async fn release_repository(&self, ctx: ReleaseContext) -> ReleaseResult<ReleaseContext> {
        if !ctx.changes.any() {
            info!(repo = %ctx.repo, "no locale or dev changes");
            return Ok(ctx.with_status(ReleaseStatus::Skipped));
        }

        let ctx = self.execute(&self.workflows.checkout, ctx, Phase::Checkout).await?;
        if ctx.status.short_circuits() {
            info!(repo = %ctx.repo, branch = %ctx.branch, "l10n branch already exists remotely");
            return Ok(ctx);
        }

        let private = self
            .probe
            .is_package_private(&ctx.manifest_path())
            .map_err(|source| ReleaseError::Probe {
                repo: ctx.repo.clone(),
                phase: Phase::Visibility,
                source,
            })?;
        if private {
            info!(repo = %ctx.repo, "private package, awaiting qa bump");
            return Ok(ctx.with_status(ReleaseStatus::Private));
        }

        let unattended = without_interactive(&self.workflows.pre_release);
        let flow = filter_by_topology(&ctx, &unattended);
        let ctx = self.execute(&flow, ctx, Phase::Release).await?;

        if ctx.status.short_circuits() {
            return Ok(ctx);
        }
        let status = if ctx.host {
            ReleaseStatus::QaBumped
        } else {
            ReleaseStatus::PreReleased
        };
        Ok(ctx.with_status(status))
    }

    /// Run the QA bump against the first host repository if the decision
    /// calls for it, then promote its record to `qa bumped`.
    #[instrument(skip_all)]
    async fn run_qa_bump(
        &self,
        outcomes: &mut ResultAccumulator,
    ) -> ReleaseResult<Option<QaBumpPlan>> {
        let Some(plan) = plan_qa_bump(outcomes) else {
            info!("no eligible host repository, skipping qa bump");
            return Ok(None);
        };

        info!(
            repo = %plan.repo,
            dependencies = plan.dependencies.len(),
            "bumping qa dependencies"
        );
        let mut progress = self.progress.create("creating qa branch");
        progress.start();

        let ctx = plan.context(&self.root, Arc::clone(&self.settings));
        if let Err(err) = self.execute(&self.workflows.qa_bump, ctx, Phase::QaBump).await {
            progress.fail();
            return Err(err);
        }

        outcomes.set_status(plan.host_index, ReleaseStatus::QaBumped);
        progress.succeed();
        Ok(Some(plan))
    }

    async fn execute(
        &self,
        workflow: &Workflow,
        ctx: ReleaseContext,
        phase: Phase,
    ) -> ReleaseResult<ReleaseContext> {
        let repo = ctx.repo.clone();
        WorkflowExecutor::run(workflow, ctx)
            .await
            .map_err(|source| ReleaseError::Workflow {
                repo,
                phase,
                source,
            })
    }
}
