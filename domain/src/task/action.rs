//! Task action entity
//!
//! One materialized step of a task's plan. Actions with a non-read impact
//! level pause in `awaiting_approval` until a human approves or rejects
//! them; a rejection is terminal for the action and triggers backend
//! replanning of the remaining steps.

use crate::task::entities::TaskId;
use serde::{Deserialize, Serialize};

/// Identifier of a task action (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionId(String);

impl ActionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ActionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ActionId {
    fn from(s: &str) -> Self {
        ActionId::new(s)
    }
}

/// How intrusive a tool invocation is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImpactLevel {
    #[default]
    Read,
    Write,
    HighWrite,
}

impl ImpactLevel {
    pub fn as_str(&self) -> &str {
        match self {
            ImpactLevel::Read => "read",
            ImpactLevel::Write => "write",
            ImpactLevel::HighWrite => "high_write",
        }
    }

    /// Only non-read actions may pause for human approval.
    pub fn requires_approval(&self) -> bool {
        !matches!(self, ImpactLevel::Read)
    }
}

impl std::fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ImpactLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(ImpactLevel::Read),
            "write" => Ok(ImpactLevel::Write),
            "high_write" => Ok(ImpactLevel::HighWrite),
            other => Err(format!("unknown impact level: {other}")),
        }
    }
}

/// Status of a task action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    #[default]
    Pending,
    Executing,
    Completed,
    Failed,
    AwaitingApproval,
    Approved,
    Rejected,
}

impl ActionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ActionStatus::Pending => "pending",
            ActionStatus::Executing => "executing",
            ActionStatus::Completed => "completed",
            ActionStatus::Failed => "failed",
            ActionStatus::AwaitingApproval => "awaiting_approval",
            ActionStatus::Approved => "approved",
            ActionStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ActionStatus::Completed | ActionStatus::Failed | ActionStatus::Rejected
        )
    }

    /// `Approved` and `Rejected` are only reachable from
    /// `AwaitingApproval`; everything else follows the execution flow.
    pub fn may_transition_to(&self, next: &ActionStatus) -> bool {
        match next {
            ActionStatus::Approved | ActionStatus::Rejected => {
                matches!(self, ActionStatus::AwaitingApproval)
            }
            _ => !self.is_terminal(),
        }
    }
}

impl std::fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ActionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ActionStatus::Pending),
            "executing" => Ok(ActionStatus::Executing),
            "completed" => Ok(ActionStatus::Completed),
            "failed" => Ok(ActionStatus::Failed),
            "awaiting_approval" => Ok(ActionStatus::AwaitingApproval),
            "approved" => Ok(ActionStatus::Approved),
            "rejected" => Ok(ActionStatus::Rejected),
            other => Err(format!("unknown action status: {other}")),
        }
    }
}

/// One step of a task's plan once it begins executing (Entity)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentTaskAction {
    pub id: ActionId,
    /// Owning task
    pub task_id: TaskId,
    pub tool_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    pub impact_level: ImpactLevel,
    pub status: ActionStatus,
    /// Opaque structured result from the tool
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_output: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_cents: Option<f64>,
}

impl AgentTaskAction {
    pub fn new(
        id: impl Into<ActionId>,
        task_id: impl Into<TaskId>,
        tool_name: impl Into<String>,
        impact_level: ImpactLevel,
    ) -> Self {
        Self {
            id: id.into(),
            task_id: task_id.into(),
            tool_name: tool_name.into(),
            reasoning: None,
            impact_level,
            status: ActionStatus::Pending,
            tool_output: None,
            rejection_reason: None,
            latency_ms: None,
            cost_cents: None,
        }
    }

    pub fn with_status(mut self, status: ActionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }

    pub fn is_awaiting_approval(&self) -> bool {
        self.status == ActionStatus::AwaitingApproval
    }

    /// Check the approval invariant: read-impact actions never pause for
    /// approval.
    pub fn validate(&self) -> Result<(), crate::core::error::DomainError> {
        if self.status == ActionStatus::AwaitingApproval && !self.impact_level.requires_approval() {
            return Err(crate::core::error::DomainError::InvariantViolated(format!(
                "action {} is awaiting approval with read impact",
                self.id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impact_level_approval() {
        assert!(!ImpactLevel::Read.requires_approval());
        assert!(ImpactLevel::Write.requires_approval());
        assert!(ImpactLevel::HighWrite.requires_approval());
    }

    #[test]
    fn test_approval_only_from_awaiting() {
        assert!(ActionStatus::AwaitingApproval.may_transition_to(&ActionStatus::Approved));
        assert!(ActionStatus::AwaitingApproval.may_transition_to(&ActionStatus::Rejected));
        assert!(!ActionStatus::Pending.may_transition_to(&ActionStatus::Approved));
        assert!(!ActionStatus::Executing.may_transition_to(&ActionStatus::Rejected));
    }

    #[test]
    fn test_rejected_is_terminal() {
        assert!(ActionStatus::Rejected.is_terminal());
        assert!(!ActionStatus::Rejected.may_transition_to(&ActionStatus::Executing));
        assert!(!ActionStatus::Rejected.may_transition_to(&ActionStatus::Approved));
    }

    #[test]
    fn test_read_action_cannot_await_approval() {
        let action = AgentTaskAction::new("act-1", "task-1", "fetch_reviews", ImpactLevel::Read)
            .with_status(ActionStatus::AwaitingApproval);
        assert!(action.validate().is_err());

        let action = AgentTaskAction::new("act-2", "task-1", "update_goal", ImpactLevel::Write)
            .with_status(ActionStatus::AwaitingApproval);
        assert!(action.validate().is_ok());
    }
}
