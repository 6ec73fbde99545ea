//! l10n release orchestration.
//!
//! Walks a fleet of repositories, pre-releases the ones with pending locale
//! or dev changes, bumps the host repository's dependencies to the new tags
//! and reports what happened to each.

pub mod accumulator;
pub mod config;
pub mod context;
pub mod error;
pub mod fakes;
pub mod git;
pub mod manifest;
pub mod orchestrator;
pub mod probe;
pub mod progress;
pub mod qa_bump;
pub mod reporting;
pub mod steps;
pub mod telemetry;
pub mod version;
pub mod workflow;

pub use accumulator::{OutcomeRecord, ResultAccumulator};
pub use config::{ReleaseConfig, ReleaseSettings, RepositoryEntry};
pub use context::{BranchTopology, Changes, DependencyEntry, ReleaseContext, ReleaseStatus};
pub use error::{
    ConfigError, Phase, ReleaseError, ReleaseResult, StepError, StepResult, WorkflowError,
};
pub use orchestrator::{Orchestrator, RunMode, RunReport, Workflows};
pub use probe::{GitProbe, RepoProbe};
pub use progress::{NoProgress, Progress, ProgressFactory, TracingProgressFactory};
pub use qa_bump::{plan_qa_bump, QaBumpPlan};
pub use steps::default_workflows;
pub use version::ReleaseType;
pub use workflow::{StepTraits, Topology, Workflow, WorkflowExecutor, WorkflowStep};
