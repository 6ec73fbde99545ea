//! Per-repository release context.
//!
//! A [`ReleaseContext`] is built fresh for every repository the orchestrator
//! visits. Workflow steps take it by value and hand back the next version, so
//! exactly one step owns it at a time.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{ReleaseSettings, RepositoryEntry};

/// File name of the manifest inspected for version and visibility.
pub const MANIFEST_FILE: &str = "package.json";

/// Lifecycle status of a repository within a run.
///
/// Live runs resolve to `skipped`, `private`, `pre-released` or `qa bumped`;
/// check runs only ever resolve to `changes` or `no changes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReleaseStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "skipped")]
    Skipped,
    #[serde(rename = "private")]
    Private,
    #[serde(rename = "pre-released")]
    PreReleased,
    #[serde(rename = "qa bumped")]
    QaBumped,
    #[serde(rename = "changes")]
    Changes,
    #[serde(rename = "no changes")]
    NoChanges,
}

impl ReleaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseStatus::Pending => "pending",
            ReleaseStatus::Skipped => "skipped",
            ReleaseStatus::Private => "private",
            ReleaseStatus::PreReleased => "pre-released",
            ReleaseStatus::QaBumped => "qa bumped",
            ReleaseStatus::Changes => "changes",
            ReleaseStatus::NoChanges => "no changes",
        }
    }

    /// Whether remaining workflow steps must not run for this repository.
    pub fn short_circuits(&self) -> bool {
        matches!(self, ReleaseStatus::Skipped)
    }
}

impl fmt::Display for ReleaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pending changes detected for a repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Changes {
    /// Localisation content changed.
    pub locale: bool,
    /// Source content changed.
    pub dev: bool,
    /// Commits since the last release tag.
    pub diff: u32,
}

impl Changes {
    pub fn any(&self) -> bool {
        self.locale || self.dev
    }
}

/// Branch structure of a repository's remote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchTopology {
    pub has_develop: bool,
}

impl BranchTopology {
    /// Branch that integrates ongoing work: `develop` when present, else `master`.
    pub fn integration_branch(&self) -> &'static str {
        if self.has_develop {
            "develop"
        } else {
            "master"
        }
    }
}

/// Dependency version handed to the host repository by the QA bump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEntry {
    pub pkg: String,
    pub version: String,
}

/// Mutable-by-replacement state for the repository currently being processed.
#[derive(Debug, Clone)]
pub struct ReleaseContext {
    pub repo: String,
    pub branch: String,
    pub cwd: PathBuf,
    /// Release or pre-release tag, once one has been produced.
    pub tag: Option<String>,
    /// Version written to the manifest by the release workflow.
    pub version: Option<String>,
    pub status: ReleaseStatus,
    pub changes: Changes,
    pub host: bool,
    pub topology: BranchTopology,
    pub settings: Arc<ReleaseSettings>,
    /// Only populated for the QA bump.
    pub dependencies: Vec<DependencyEntry>,
    /// Only populated for the QA bump.
    pub change_reason: Option<String>,
}

impl ReleaseContext {
    /// Fresh context for `entry`, rooted at `root/<repo>`.
    pub fn for_entry(
        entry: &RepositoryEntry,
        root: &Path,
        settings: Arc<ReleaseSettings>,
        topology: BranchTopology,
    ) -> Self {
        Self {
            repo: entry.repo.clone(),
            branch: entry.branch.clone(),
            cwd: root.join(&entry.repo),
            tag: None,
            version: None,
            status: ReleaseStatus::Pending,
            changes: Changes::default(),
            host: entry.host,
            topology,
            settings,
            dependencies: Vec::new(),
            change_reason: None,
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.cwd.join(MANIFEST_FILE)
    }

    pub fn with_status(mut self, status: ReleaseStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_changes(mut self, changes: Changes) -> Self {
        self.changes = changes;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(repo: &str, host: bool) -> RepositoryEntry {
        RepositoryEntry {
            repo: repo.to_string(),
            branch: "feature-l10n".to_string(),
            host,
        }
    }

    #[test]
    fn test_status_strings_match_report_vocabulary() {
        assert_eq!(ReleaseStatus::PreReleased.to_string(), "pre-released");
        assert_eq!(ReleaseStatus::QaBumped.to_string(), "qa bumped");
        assert_eq!(ReleaseStatus::NoChanges.to_string(), "no changes");
        let json = serde_json::to_string(&ReleaseStatus::QaBumped).unwrap();
        assert_eq!(json, "\"qa bumped\"");
    }

    #[test]
    fn test_only_skipped_short_circuits() {
        assert!(ReleaseStatus::Skipped.short_circuits());
        assert!(!ReleaseStatus::Private.short_circuits());
        assert!(!ReleaseStatus::Pending.short_circuits());
    }

    #[test]
    fn test_for_entry_builds_working_directory() {
        let settings = Arc::new(ReleaseSettings::default());
        let ctx = ReleaseContext::for_entry(
            &entry("web-app", true),
            Path::new("/src/fleet"),
            settings,
            BranchTopology { has_develop: true },
        );
        assert_eq!(ctx.cwd, PathBuf::from("/src/fleet/web-app"));
        assert_eq!(ctx.manifest_path(), PathBuf::from("/src/fleet/web-app/package.json"));
        assert_eq!(ctx.status, ReleaseStatus::Pending);
        assert!(ctx.tag.is_none());
        assert!(ctx.host);
        assert_eq!(ctx.topology.integration_branch(), "develop");
    }

    #[test]
    fn test_changes_any() {
        assert!(!Changes::default().any());
        assert!(Changes { locale: true, ..Changes::default() }.any());
        assert!(Changes { dev: true, ..Changes::default() }.any());
    }
}
