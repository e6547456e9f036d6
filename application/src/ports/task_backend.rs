//! Task backend port
//!
//! Defines the interface for mirroring and commanding backend-owned tasks:
//! the read side feeds [`TaskLifecycleSync`](crate::use_cases::task_sync),
//! the narrow write side carries cancel/approve/reject commands.

use async_trait::async_trait;
use relay_domain::{ActionId, ActiveAgentSummary, AgentTask, AgentTaskAction, TaskId};
use thiserror::Error;

/// Errors that can occur while reading or commanding task state
#[derive(Error, Debug)]
pub enum TaskBackendError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Backend returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Invalid response from backend: {0}")]
    InvalidResponse(String),

    #[error("Task not found: {0}")]
    NotFound(String),

    #[error("Backend error: {0}")]
    Other(String),
}

/// Read/command surface of the remote agent-execution backend
///
/// Task state is owned by the backend; everything read through this port is
/// a snapshot to be reconciled into the local mirror.
#[async_trait]
pub trait TaskBackend: Send + Sync {
    /// Fetch the full task list (summary level).
    async fn list_tasks(&self) -> Result<Vec<AgentTask>, TaskBackendError>;

    /// Fetch one task with its plan and materialized actions.
    async fn get_task(&self, id: &TaskId) -> Result<AgentTask, TaskBackendError>;

    /// Fetch all actions currently paused for human approval, across tasks.
    async fn pending_approvals(&self) -> Result<Vec<AgentTaskAction>, TaskBackendError>;

    /// Ask the backend to stop further step execution for a task.
    async fn cancel_task(&self, id: &TaskId) -> Result<(), TaskBackendError>;

    /// Approve an action paused on human approval.
    async fn approve_action(&self, id: &ActionId) -> Result<(), TaskBackendError>;

    /// Reject an action with a reason; the backend replans remaining steps.
    async fn reject_action(&self, id: &ActionId, reason: &str) -> Result<(), TaskBackendError>;

    /// Fetch the live-activity feed of currently running agents.
    async fn active_agents(&self) -> Result<Vec<ActiveAgentSummary>, TaskBackendError>;
}
