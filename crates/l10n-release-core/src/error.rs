//! Error taxonomy for l10n release orchestration.
//!
//! Skip outcomes (`skipped`, `private`) are not errors; they are recorded as a
//! [`ReleaseStatus`](crate::context::ReleaseStatus) on the outcome record.

use std::fmt;
use std::path::PathBuf;

use crate::context::ReleaseContext;

/// Problems with `.tag-releaserc.json` or the run settings. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("config has no `l10n` repositories")]
    EmptyRepositoryList,

    #[error("config `rootDirectory` must not be empty")]
    EmptyRootDirectory,

    #[error("repository entry #{index} is missing `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("invalid host flag for {repo}: {value:?} (expected \"true\" or \"false\")")]
    InvalidHostFlag { repo: String, value: String },

    #[error("unknown release type: {0}")]
    UnknownReleaseType(String),
}

/// Failure of a single workflow step's underlying operation.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("`git {command}` failed: {stderr}")]
    Git { command: String, stderr: String },

    #[error("`git {command}` produced more than {limit} bytes of output")]
    OutputTooLarge { command: String, limit: usize },

    #[error("manifest error in {path}: {reason}")]
    Manifest { path: PathBuf, reason: String },

    #[error("invalid version {version:?}: {source}")]
    Version {
        version: String,
        #[source]
        source: semver::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// A step failure together with where it happened.
///
/// `context` is the context as it stood before the failing step ran; the
/// executor performs no rollback.
#[derive(Debug, thiserror::Error)]
#[error("workflow `{workflow}` failed at step `{step}`: {source}")]
pub struct WorkflowError {
    pub workflow: String,
    pub step: String,
    #[source]
    pub source: StepError,
    pub context: Box<ReleaseContext>,
}

/// Orchestrator state in which a failure surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Sync,
    Checkout,
    Visibility,
    Release,
    Check,
    QaBump,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Sync => "sync",
            Phase::Checkout => "checkout",
            Phase::Visibility => "visibility check",
            Phase::Release => "release",
            Phase::Check => "check",
            Phase::QaBump => "qa bump",
        };
        f.write_str(name)
    }
}

/// Top-level errors produced by a release run.
#[derive(Debug, thiserror::Error)]
pub enum ReleaseError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{repo}: {phase} failed: {source}")]
    Workflow {
        repo: String,
        phase: Phase,
        #[source]
        source: WorkflowError,
    },

    #[error("{repo}: {phase} failed: {source}")]
    Probe {
        repo: String,
        phase: Phase,
        #[source]
        source: StepError,
    },

    #[error("check workflow contains mutating step `{step}`")]
    MutatingCheckStep { step: String },
}

impl ReleaseError {
    /// Repository the failure is attributed to, if any.
    pub fn repo(&self) -> Option<&str> {
        match self {
            ReleaseError::Workflow { repo, .. } | ReleaseError::Probe { repo, .. } => Some(repo),
            _ => None,
        }
    }
}

/// Result type for step operations.
pub type StepResult<T> = std::result::Result<T, StepError>;

/// Result type for release runs.
pub type ReleaseResult<T> = std::result::Result<T, ReleaseError>;
