//! Sequential workflow execution.

use tracing::{debug, instrument};

use crate::context::ReleaseContext;
use crate::error::WorkflowError;
use crate::workflow::Workflow;

/// Runs a workflow's steps strictly in order against one context.
pub struct WorkflowExecutor;

impl WorkflowExecutor {
    /// Execute `workflow`, threading the context from step to step.
    ///
    /// Stops without error as soon as the context carries a short-circuiting
    /// status. The first failing step ends the run; the returned
    /// [`WorkflowError`] carries the context from before that step. Nothing is
    /// rolled back.
    #[instrument(skip_all, fields(workflow = %workflow.name(), repo = %ctx.repo))]
    pub async fn run(
        workflow: &Workflow,
        mut ctx: ReleaseContext,
    ) -> Result<ReleaseContext, WorkflowError> {
        for step in workflow.steps() {
            if ctx.status.short_circuits() {
                debug!(status = %ctx.status, step = step.name(), "short-circuit, skipping rest");
                break;
            }

            debug!(step = step.name(), "running step");
            let before = ctx.clone();
            ctx = step.run(ctx).await.map_err(|source| WorkflowError {
                workflow: workflow.name().to_string(),
                step: step.name().to_string(),
                source,
                context: Box::new(before),
            })?;
        }

        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ReleaseStatus;
    use crate::error::StepError;
    use crate::fakes::{fake_context, FakeStep, StepLog};

    #[tokio::test]
    async fn test_runs_steps_in_order() {
        let log = StepLog::default();
        let flow = Workflow::new("sync")
            .step(FakeStep::new("fetch", &log))
            .step(FakeStep::new("reset", &log))
            .step(FakeStep::new("detect", &log));

        let ctx = WorkflowExecutor::run(&flow, fake_context("core-ui")).await.unwrap();
        assert_eq!(ctx.repo, "core-ui");
        assert_eq!(log.steps_for("core-ui"), vec!["fetch", "reset", "detect"]);
    }

    #[tokio::test]
    async fn test_stops_at_first_failure_with_prior_context() {
        let log = StepLog::default();
        let flow = Workflow::new("pre-release")
            .step(FakeStep::new("bump", &log).with_action(|ctx| Ok(ctx.with_version("1.1.0"))))
            .step(FakeStep::new("push", &log).with_action(|_| {
                Err(StepError::Other("remote rejected".to_string()))
            }))
            .step(FakeStep::new("never", &log));

        let err = WorkflowExecutor::run(&flow, fake_context("core-ui"))
            .await
            .unwrap_err();
        assert_eq!(err.workflow, "pre-release");
        assert_eq!(err.step, "push");
        assert_eq!(err.context.version.as_deref(), Some("1.1.0"));
        assert!(err.to_string().contains("remote rejected"));
        assert_eq!(log.steps_for("core-ui"), vec!["bump", "push"]);
    }

    #[tokio::test]
    async fn test_skipped_status_short_circuits_remaining_steps() {
        let log = StepLog::default();
        let flow = Workflow::new("checkout")
            .step(
                FakeStep::new("checkout-l10n", &log)
                    .with_action(|ctx| Ok(ctx.with_status(ReleaseStatus::Skipped))),
            )
            .step(FakeStep::new("tag", &log));

        let ctx = WorkflowExecutor::run(&flow, fake_context("core-ui")).await.unwrap();
        assert_eq!(ctx.status, ReleaseStatus::Skipped);
        assert_eq!(log.steps_for("core-ui"), vec!["checkout-l10n"]);
    }

    #[tokio::test]
    async fn test_empty_workflow_returns_context_unchanged() {
        let ctx = WorkflowExecutor::run(&Workflow::new("empty"), fake_context("core-ui"))
            .await
            .unwrap();
        assert_eq!(ctx.status, ReleaseStatus::Pending);
    }
}
