//! Agent task entity

use crate::core::agent_kind::AgentKind;
use crate::core::error::DomainError;
use crate::task::action::{ActionStatus, AgentTaskAction};
use crate::task::status::TaskStatus;
use serde::{Deserialize, Serialize};

/// Identifier of an agent task (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        TaskId::new(s)
    }
}

/// One planned step of a task, before it materializes as an action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanStep {
    pub tool_name: String,
    pub reasoning: String,
}

impl PlanStep {
    pub fn new(tool_name: impl Into<String>, reasoning: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            reasoning: reasoning.into(),
        }
    }
}

/// A unit of autonomous, possibly multi-step work (Entity)
///
/// Created by the backend in response to a goal; status transitions are
/// driven exclusively by backend state. The client mirrors tasks read-mostly
/// and only issues cancel/approve/reject commands against them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentTask {
    pub id: TaskId,
    pub title: String,
    pub goal: String,
    /// `coordinator` denotes a multi-agent task
    pub agent_kind: AgentKind,
    pub status: TaskStatus,
    pub current_step: u32,
    pub total_steps: u32,
    /// Ordered planned steps
    #[serde(default)]
    pub plan: Vec<PlanStep>,
    /// Ordered actions already materialized from the plan
    #[serde(default)]
    pub actions: Vec<AgentTaskAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// Task initiated by the system rather than a user request
    #[serde(default)]
    pub is_proactive: bool,
    /// Back-reference forming a tree of sub-tasks; no cycles permitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_task_id: Option<TaskId>,
}

impl AgentTask {
    pub fn new(id: impl Into<TaskId>, title: impl Into<String>, goal: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            goal: goal.into(),
            agent_kind: AgentKind::Performance,
            status: TaskStatus::Pending,
            current_step: 0,
            total_steps: 0,
            plan: Vec::new(),
            actions: Vec::new(),
            error: None,
            result: None,
            is_proactive: false,
            parent_task_id: None,
        }
    }

    pub fn with_agent_kind(mut self, kind: AgentKind) -> Self {
        self.agent_kind = kind;
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_steps(mut self, current: u32, total: u32) -> Self {
        self.current_step = current;
        self.total_steps = total;
        self
    }

    pub fn with_parent(mut self, parent: impl Into<TaskId>) -> Self {
        self.parent_task_id = Some(parent.into());
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_cancellable(&self) -> bool {
        self.status.is_cancellable()
    }

    /// True for tasks run by the coordinating agent across multiple
    /// specialists.
    pub fn is_multi_agent(&self) -> bool {
        self.agent_kind.is_coordinator()
    }

    /// Actions currently paused for human approval.
    pub fn awaiting_approval(&self) -> impl Iterator<Item = &AgentTaskAction> {
        self.actions.iter().filter(|a| a.is_awaiting_approval())
    }

    /// Look up an action by id.
    pub fn action(&self, id: &crate::task::action::ActionId) -> Option<&AgentTaskAction> {
        self.actions.iter().find(|a| &a.id == id)
    }

    /// Check the structural invariants:
    /// - `current_step <= total_steps`
    /// - `actions.len() <= plan.len()`
    /// - a completed task has fully materialized its plan with no failed or
    ///   rejected action outstanding
    /// - every action's own invariants hold
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.current_step > self.total_steps {
            return Err(DomainError::InvariantViolated(format!(
                "task {}: current_step {} exceeds total_steps {}",
                self.id, self.current_step, self.total_steps
            )));
        }
        if self.actions.len() > self.plan.len() {
            return Err(DomainError::InvariantViolated(format!(
                "task {}: {} actions exceed {} planned steps",
                self.id,
                self.actions.len(),
                self.plan.len()
            )));
        }
        if self.status == TaskStatus::Completed {
            if self.actions.len() != self.plan.len() {
                return Err(DomainError::InvariantViolated(format!(
                    "task {}: completed with {} of {} steps materialized",
                    self.id,
                    self.actions.len(),
                    self.plan.len()
                )));
            }
            if let Some(bad) = self
                .actions
                .iter()
                .find(|a| matches!(a.status, ActionStatus::Failed | ActionStatus::Rejected))
            {
                return Err(DomainError::InvariantViolated(format!(
                    "task {}: completed with action {} in state {}",
                    self.id, bad.id, bad.status
                )));
            }
        }
        for action in &self.actions {
            action.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::action::ImpactLevel;

    fn planned_task() -> AgentTask {
        let mut task = AgentTask::new("task-1", "Summarize reviews", "Summarize Q2 reviews")
            .with_status(TaskStatus::Executing)
            .with_steps(1, 2);
        task.plan = vec![
            PlanStep::new("fetch_reviews", "Need the raw review data"),
            PlanStep::new("summarize", "Condense into themes"),
        ];
        task.actions = vec![
            AgentTaskAction::new("act-1", "task-1", "fetch_reviews", ImpactLevel::Read)
                .with_status(ActionStatus::Completed),
        ];
        task
    }

    #[test]
    fn test_valid_task_passes() {
        assert!(planned_task().validate().is_ok());
    }

    #[test]
    fn test_more_actions_than_plan_rejected() {
        let mut task = planned_task();
        task.plan.clear();
        assert!(task.validate().is_err());
    }

    #[test]
    fn test_step_counter_bound() {
        let task = planned_task().with_steps(3, 2);
        assert!(task.validate().is_err());
    }

    #[test]
    fn test_completed_requires_full_materialization() {
        let task = planned_task().with_status(TaskStatus::Completed);
        // Only one of two planned steps materialized
        assert!(task.validate().is_err());

        let mut task = planned_task().with_status(TaskStatus::Completed);
        task.actions.push(
            AgentTaskAction::new("act-2", "task-1", "summarize", ImpactLevel::Read)
                .with_status(ActionStatus::Completed),
        );
        assert!(task.validate().is_ok());
    }

    #[test]
    fn test_completed_with_failed_action_rejected() {
        let mut task = planned_task().with_status(TaskStatus::Completed);
        task.actions.push(
            AgentTaskAction::new("act-2", "task-1", "summarize", ImpactLevel::Read)
                .with_status(ActionStatus::Failed),
        );
        assert!(task.validate().is_err());
    }

    #[test]
    fn test_awaiting_approval_iterator() {
        let mut task = planned_task();
        task.plan.push(PlanStep::new("update_goal", "Apply the change"));
        task.actions.push(
            AgentTaskAction::new("act-2", "task-1", "update_goal", ImpactLevel::Write)
                .with_status(ActionStatus::AwaitingApproval),
        );
        let awaiting: Vec<_> = task.awaiting_approval().collect();
        assert_eq!(awaiting.len(), 1);
        assert_eq!(awaiting[0].id.as_str(), "act-2");
    }

    #[test]
    fn test_coordinator_task_is_multi_agent() {
        let task = planned_task().with_agent_kind(AgentKind::Coordinator);
        assert!(task.is_multi_agent());
        assert!(!planned_task().is_multi_agent());
    }
}
