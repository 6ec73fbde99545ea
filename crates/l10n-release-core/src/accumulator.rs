//! Append-only per-repository outcomes of a run.

use serde::{Deserialize, Serialize};

use crate::context::{Changes, ReleaseContext, ReleaseStatus};

/// Snapshot of one repository's result, taken when its processing finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub repo: String,
    pub branch: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub status: ReleaseStatus,
    pub host: bool,
    pub changes: Changes,
}

impl OutcomeRecord {
    pub fn from_context(ctx: &ReleaseContext) -> Self {
        Self {
            repo: ctx.repo.clone(),
            branch: ctx.branch.clone(),
            tag: ctx.tag.clone().filter(|t| !t.is_empty()),
            status: ctx.status,
            host: ctx.host,
            changes: ctx.changes,
        }
    }

    /// Tag text, empty when none was produced.
    pub fn tag_str(&self) -> &str {
        self.tag.as_deref().unwrap_or("")
    }
}

/// Outcome records in processing order (which is configuration order).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultAccumulator {
    records: Vec<OutcomeRecord>,
}

impl ResultAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: OutcomeRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[OutcomeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record flagged as host, with its position.
    ///
    /// Only the first host is ever considered; further host entries are
    /// treated like ordinary repositories.
    pub fn first_host(&self) -> Option<(usize, &OutcomeRecord)> {
        self.records.iter().enumerate().find(|(_, r)| r.host)
    }

    /// Overwrite the status of the record at `index`. The only mutation
    /// allowed after a record is appended.
    pub(crate) fn set_status(&mut self, index: usize, status: ReleaseStatus) -> bool {
        match self.records.get_mut(index) {
            Some(record) => {
                record.status = status;
                true
            }
            None => false,
        }
    }

    pub fn into_records(self) -> Vec<OutcomeRecord> {
        self.records
    }
}
