//! Approval gate for actions paused on human decision.
//!
//! Approve and reject are idempotent from the caller's perspective: acting
//! on an action that is no longer awaiting approval (or already has a
//! command in flight) is a no-effect result, not an error, and sends
//! nothing over the network. A rejection must carry a non-empty reason;
//! that precondition is checked before any network call.

use crate::ports::event_logger::{EventLogger, NoEventLogger, OrchestrationEvent};
use crate::ports::task_backend::{TaskBackend, TaskBackendError};
use crate::use_cases::task_mirror::{PendingCommand, TaskMirror};
use relay_domain::{ActionId, ActionStatus};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from approval-gate operations
#[derive(Error, Debug)]
pub enum ApprovalError {
    #[error("Rejection requires a non-empty reason")]
    EmptyReason,

    #[error(transparent)]
    Backend(#[from] TaskBackendError),
}

/// What an approve/reject call actually did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalOutcome {
    /// The command was sent; the next sync tick confirms the new status
    Submitted,
    /// The action was not awaiting approval (or a command is already in
    /// flight); nothing was sent
    NoEffect,
}

/// Gate for approving or rejecting actions awaiting human decision
pub struct ApprovalGate<B: TaskBackend> {
    backend: Arc<B>,
    mirror: Arc<TaskMirror>,
    logger: Arc<dyn EventLogger>,
}

impl<B: TaskBackend> ApprovalGate<B> {
    pub fn new(backend: Arc<B>, mirror: Arc<TaskMirror>) -> Self {
        Self {
            backend,
            mirror,
            logger: Arc::new(NoEventLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn EventLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Approve an awaiting action. Nothing changes locally beyond the
    /// pending-command marker until the next sync confirms the transition.
    pub async fn approve(&self, id: &ActionId) -> Result<ApprovalOutcome, ApprovalError> {
        if !self.actionable(id) {
            debug!("approve on {} has no effect", id);
            return Ok(ApprovalOutcome::NoEffect);
        }

        self.mirror
            .mark_pending_command(id.clone(), PendingCommand::Approve);
        match self.backend.approve_action(id).await {
            Ok(()) => {
                info!("Approved action {}", id);
                self.logger.log(OrchestrationEvent::new(
                    "approval_command",
                    serde_json::json!({ "action_id": id.as_str(), "decision": "approve" }),
                ));
                Ok(ApprovalOutcome::Submitted)
            }
            Err(e) => {
                warn!("Approve for {} failed, rolling back: {}", id, e);
                self.mirror.clear_pending_command(id);
                Err(e.into())
            }
        }
    }

    /// Reject an awaiting action with a reason. The backend replans the
    /// remaining steps of the owning task.
    pub async fn reject(
        &self,
        id: &ActionId,
        reason: &str,
    ) -> Result<ApprovalOutcome, ApprovalError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ApprovalError::EmptyReason);
        }

        if !self.actionable(id) {
            debug!("reject on {} has no effect", id);
            return Ok(ApprovalOutcome::NoEffect);
        }

        self.mirror.mark_pending_command(
            id.clone(),
            PendingCommand::Reject {
                reason: reason.to_string(),
            },
        );
        match self.backend.reject_action(id, reason).await {
            Ok(()) => {
                info!("Rejected action {}: {}", id, reason);
                self.logger.log(OrchestrationEvent::new(
                    "approval_command",
                    serde_json::json!({
                        "action_id": id.as_str(),
                        "decision": "reject",
                        "reason": reason,
                    }),
                ));
                Ok(ApprovalOutcome::Submitted)
            }
            Err(e) => {
                warn!("Reject for {} failed, rolling back: {}", id, e);
                self.mirror.clear_pending_command(id);
                Err(e.into())
            }
        }
    }

    /// Count of actions currently awaiting approval across all tracked
    /// tasks, for use as a pending-work indicator.
    pub fn pending_approval_count(&self) -> usize {
        self.mirror.awaiting_approval_count()
    }

    /// A command is meaningful only for an action the mirror still shows
    /// awaiting approval with no command already in flight. An action the
    /// mirror has never seen is also commandable: the backend is the
    /// authority and the mirror may simply be behind.
    fn actionable(&self, id: &ActionId) -> bool {
        if self.mirror.has_pending_command(id) {
            return false;
        }
        match self.mirror.action_status(id) {
            Some(status) => status == ActionStatus::AwaitingApproval,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use relay_domain::{
        ActiveAgentSummary, AgentTask, AgentTaskAction, ImpactLevel, PlanStep, TaskId, TaskStatus,
    };
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingBackend {
        approve_calls: AtomicUsize,
        reject_calls: AtomicUsize,
        fail_next: AtomicBool,
    }

    impl CountingBackend {
        fn failing() -> Self {
            let backend = Self::default();
            backend.fail_next.store(true, Ordering::SeqCst);
            backend
        }

        fn take_failure(&self) -> Result<(), TaskBackendError> {
            if self.fail_next.swap(false, Ordering::SeqCst) {
                Err(TaskBackendError::Connection("backend down".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl TaskBackend for CountingBackend {
        async fn list_tasks(&self) -> Result<Vec<AgentTask>, TaskBackendError> {
            Ok(vec![])
        }

        async fn get_task(&self, id: &TaskId) -> Result<AgentTask, TaskBackendError> {
            Err(TaskBackendError::NotFound(id.to_string()))
        }

        async fn pending_approvals(&self) -> Result<Vec<AgentTaskAction>, TaskBackendError> {
            Ok(vec![])
        }

        async fn cancel_task(&self, _id: &TaskId) -> Result<(), TaskBackendError> {
            Ok(())
        }

        async fn approve_action(&self, _id: &ActionId) -> Result<(), TaskBackendError> {
            self.approve_calls.fetch_add(1, Ordering::SeqCst);
            self.take_failure()
        }

        async fn reject_action(
            &self,
            _id: &ActionId,
            _reason: &str,
        ) -> Result<(), TaskBackendError> {
            self.reject_calls.fetch_add(1, Ordering::SeqCst);
            self.take_failure()
        }

        async fn active_agents(&self) -> Result<Vec<ActiveAgentSummary>, TaskBackendError> {
            Ok(vec![])
        }
    }

    fn mirror_with_awaiting_action() -> Arc<TaskMirror> {
        let mirror = Arc::new(TaskMirror::new());
        let mut task = AgentTask::new("t1", "Task", "goal").with_status(TaskStatus::AwaitingApproval);
        task.plan = vec![PlanStep::new("update_goal", "step")];
        task.actions = vec![
            AgentTaskAction::new("a1", "t1", "update_goal", ImpactLevel::Write)
                .with_status(ActionStatus::AwaitingApproval),
        ];
        mirror.apply_task(task);
        mirror
    }

    #[tokio::test]
    async fn test_approve_sends_once() {
        let backend = Arc::new(CountingBackend::default());
        let gate = ApprovalGate::new(Arc::clone(&backend), mirror_with_awaiting_action());

        let outcome = gate.approve(&"a1".into()).await.unwrap();
        assert_eq!(outcome, ApprovalOutcome::Submitted);
        assert_eq!(backend.approve_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_double_approve_is_noop() {
        let backend = Arc::new(CountingBackend::default());
        let gate = ApprovalGate::new(Arc::clone(&backend), mirror_with_awaiting_action());

        assert_eq!(gate.approve(&"a1".into()).await.unwrap(), ApprovalOutcome::Submitted);
        // Command still pending: second call is a no-effect, no extra send
        assert_eq!(gate.approve(&"a1".into()).await.unwrap(), ApprovalOutcome::NoEffect);
        assert_eq!(backend.approve_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_approve_after_confirmation_is_noop() {
        let backend = Arc::new(CountingBackend::default());
        let mirror = mirror_with_awaiting_action();
        let gate = ApprovalGate::new(Arc::clone(&backend), Arc::clone(&mirror));

        gate.approve(&"a1".into()).await.unwrap();

        // Sync tick confirms the approval
        let mut task = AgentTask::new("t1", "Task", "goal").with_status(TaskStatus::Executing);
        task.plan = vec![PlanStep::new("update_goal", "step")];
        task.actions = vec![
            AgentTaskAction::new("a1", "t1", "update_goal", ImpactLevel::Write)
                .with_status(ActionStatus::Approved),
        ];
        mirror.apply_task(task);

        assert_eq!(gate.approve(&"a1".into()).await.unwrap(), ApprovalOutcome::NoEffect);
        assert_eq!(backend.approve_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reject_requires_reason() {
        let backend = Arc::new(CountingBackend::default());
        let gate = ApprovalGate::new(Arc::clone(&backend), mirror_with_awaiting_action());

        let err = gate.reject(&"a1".into(), "").await.unwrap_err();
        assert!(matches!(err, ApprovalError::EmptyReason));
        let err = gate.reject(&"a1".into(), "   ").await.unwrap_err();
        assert!(matches!(err, ApprovalError::EmptyReason));
        // The precondition failure never reached the network
        assert_eq!(backend.reject_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reject_sends_reason() {
        let backend = Arc::new(CountingBackend::default());
        let gate = ApprovalGate::new(Arc::clone(&backend), mirror_with_awaiting_action());

        let outcome = gate.reject(&"a1".into(), "wrong goal target").await.unwrap();
        assert_eq!(outcome, ApprovalOutcome::Submitted);
        assert_eq!(backend.reject_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_approve_rolls_back() {
        let backend = Arc::new(CountingBackend::failing());
        let mirror = mirror_with_awaiting_action();
        let gate = ApprovalGate::new(Arc::clone(&backend), Arc::clone(&mirror));

        let err = gate.approve(&"a1".into()).await.unwrap_err();
        assert!(matches!(err, ApprovalError::Backend(_)));
        // Rollback: the action is approvable again and the indicator is back
        assert!(!mirror.has_pending_command(&"a1".into()));
        assert_eq!(gate.pending_approval_count(), 1);

        assert_eq!(gate.approve(&"a1".into()).await.unwrap(), ApprovalOutcome::Submitted);
        assert_eq!(backend.approve_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_pending_count_tracks_commands() {
        let backend = Arc::new(CountingBackend::default());
        let gate = ApprovalGate::new(Arc::clone(&backend), mirror_with_awaiting_action());

        assert_eq!(gate.pending_approval_count(), 1);
        gate.approve(&"a1".into()).await.unwrap();
        assert_eq!(gate.pending_approval_count(), 0);
    }
}
