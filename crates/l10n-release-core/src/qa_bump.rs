//! QA bump decision: whether and how the host repository picks up the tags
//! produced by the rest of the fleet.

use std::path::Path;
use std::sync::Arc;

use crate::accumulator::{OutcomeRecord, ResultAccumulator};
use crate::config::{ReleaseSettings, RepositoryEntry};
use crate::context::{BranchTopology, DependencyEntry, ReleaseContext, ReleaseStatus};
use crate::version::dependency_version;

/// Commit message / change reason used for the QA bump.
pub const CHANGE_REASON: &str = "Updated l10n translations";

/// Everything needed to run the QA bump workflow against the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QaBumpPlan {
    /// Position of the host's record in the accumulator.
    pub host_index: usize,
    pub repo: String,
    pub branch: String,
    pub dependencies: Vec<DependencyEntry>,
    pub change_reason: String,
}

/// Decide the QA bump from a fully populated accumulator.
///
/// Returns `None` when no record is flagged host, or when the first host was
/// skipped.
pub fn plan_qa_bump(acc: &ResultAccumulator) -> Option<QaBumpPlan> {
    let (host_index, host) = acc.first_host()?;
    if host.status == ReleaseStatus::Skipped {
        return None;
    }

    Some(QaBumpPlan {
        host_index,
        repo: host.repo.clone(),
        branch: host.branch.clone(),
        dependencies: dependencies_from(acc.records()),
        change_reason: CHANGE_REASON.to_string(),
    })
}

/// Non-host records that produced a tag, as `{pkg, version}` pairs.
pub fn dependencies_from(records: &[OutcomeRecord]) -> Vec<DependencyEntry> {
    records
        .iter()
        .filter(|r| !r.host)
        .filter_map(|r| {
            r.tag.as_deref().filter(|t| !t.is_empty()).map(|tag| DependencyEntry {
                pkg: r.repo.clone(),
                version: dependency_version(tag).to_string(),
            })
        })
        .collect()
}

impl QaBumpPlan {
    /// Context pointed at the host's working directory, carrying the
    /// dependency list and change reason.
    pub fn context(&self, root: &Path, settings: Arc<ReleaseSettings>) -> ReleaseContext {
        let entry = RepositoryEntry {
            repo: self.repo.clone(),
            branch: self.branch.clone(),
            host: true,
        };
        let mut ctx = ReleaseContext::for_entry(&entry, root, settings, BranchTopology::default());
        ctx.dependencies = self.dependencies.clone();
        ctx.change_reason = Some(self.change_reason.clone());
        ctx
    }
}
