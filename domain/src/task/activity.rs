//! Live-activity feed item

use crate::core::agent_kind::AgentKind;
use crate::task::entities::TaskId;
use crate::task::status::TaskStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Condensed view of a running agent, polled independently of the task list
/// for the live-activity feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveAgentSummary {
    pub id: TaskId,
    pub agent_kind: AgentKind,
    pub title: String,
    pub status: TaskStatus,
    pub current_step: u32,
    pub total_steps: u32,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub is_proactive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_task_id: Option<TaskId>,
}

impl ActiveAgentSummary {
    /// Progress as a `(current, total)` pair for display.
    pub fn progress(&self) -> (u32, u32) {
        (self.current_step, self.total_steps)
    }
}
