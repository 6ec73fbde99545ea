//! Per-repository progress indicators.

use std::time::Instant;

use tracing::{info, warn};

/// Progress of one unit of work (a repository or the QA bump).
pub trait Progress: Send {
    fn start(&mut self);
    fn succeed(&mut self);
    fn fail(&mut self);
}

/// Creates a [`Progress`] per labelled unit of work.
pub trait ProgressFactory: Send + Sync {
    fn create(&self, label: &str) -> Box<dyn Progress>;
}

/// Reports progress as tracing events.
pub struct TracingProgress {
    label: String,
    started: Option<Instant>,
}

impl TracingProgress {
    fn elapsed_ms(&self) -> u64 {
        self.started
            .map(|s| s.elapsed().as_millis() as u64)
            .unwrap_or(0)
    }
}

impl Progress for TracingProgress {
    fn start(&mut self) {
        self.started = Some(Instant::now());
        info!(label = %self.label, "started");
    }

    fn succeed(&mut self) {
        info!(label = %self.label, duration_ms = self.elapsed_ms(), "done");
    }

    fn fail(&mut self) {
        warn!(label = %self.label, duration_ms = self.elapsed_ms(), "failed");
    }
}

/// Factory for [`TracingProgress`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgressFactory;

impl ProgressFactory for TracingProgressFactory {
    fn create(&self, label: &str) -> Box<dyn Progress> {
        Box::new(TracingProgress {
            label: label.to_string(),
            started: None,
        })
    }
}

/// Silent progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn start(&mut self) {}
    fn succeed(&mut self) {}
    fn fail(&mut self) {}
}

impl ProgressFactory for NoProgress {
    fn create(&self, _label: &str) -> Box<dyn Progress> {
        Box::new(NoProgress)
    }
}
