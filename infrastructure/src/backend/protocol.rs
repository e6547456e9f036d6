//! Wire types for the agent-execution backend (camelCase JSON).
//!
//! Conversion into domain types parses status and impact strings strictly.
//! List payloads tolerate individual malformed entries (a poll is
//! non-critical and one bad record must not blank the whole feed), while a
//! malformed chat reply is a hard error for its one request.

use chrono::{DateTime, Utc};
use relay_application::ChatReply;
use relay_domain::{
    ActiveAgentSummary, AgentTask, AgentTaskAction, PlanStep, ResponseMetadata, TaskStatus,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

// ==================== Requests ====================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinateChatRequest<'a> {
    pub message: &'a str,
    pub agent_types: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct RejectRequest<'a> {
    pub reason: &'a str,
}

// ==================== Responses ====================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponseDto {
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<ResponseMetadata>,
    #[serde(default)]
    pub suggested_actions: Vec<String>,
}

impl From<ChatResponseDto> for ChatReply {
    fn from(dto: ChatResponseDto) -> Self {
        ChatReply {
            content: dto.message,
            conversation_id: dto.conversation_id,
            metadata: dto.metadata,
            suggested_actions: dto.suggested_actions,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanStepDto {
    pub tool_name: String,
    #[serde(default)]
    pub reasoning: String,
}

impl From<PlanStepDto> for PlanStep {
    fn from(dto: PlanStepDto) -> Self {
        PlanStep::new(dto.tool_name, dto.reasoning)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDto {
    pub id: String,
    pub task_id: String,
    pub tool_name: String,
    #[serde(default)]
    pub reasoning: Option<String>,
    pub impact_level: String,
    pub status: String,
    #[serde(default)]
    pub tool_output: Option<serde_json::Value>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub latency_ms: Option<u64>,
    #[serde(default)]
    pub cost_cents: Option<f64>,
}

impl ActionDto {
    pub fn into_domain(self) -> Result<AgentTaskAction, String> {
        let impact = self.impact_level.parse()?;
        let status = self.status.parse()?;
        let mut action =
            AgentTaskAction::new(self.id.as_str(), self.task_id.as_str(), self.tool_name, impact)
                .with_status(status);
        action.reasoning = self.reasoning;
        action.tool_output = self.tool_output;
        action.rejection_reason = self.rejection_reason;
        action.latency_ms = self.latency_ms;
        action.cost_cents = self.cost_cents;
        Ok(action)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDto {
    pub id: String,
    pub title: String,
    pub goal: String,
    pub agent_type: String,
    pub status: String,
    #[serde(default)]
    pub current_step: u32,
    #[serde(default)]
    pub total_steps: u32,
    #[serde(default)]
    pub plan: Vec<PlanStepDto>,
    #[serde(default)]
    pub actions: Vec<ActionDto>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub is_proactive: bool,
    #[serde(default)]
    pub parent_task_id: Option<String>,
}

impl TaskDto {
    pub fn into_domain(self) -> Result<AgentTask, String> {
        let status: TaskStatus = self.status.parse()?;
        let mut task = AgentTask::new(self.id.as_str(), self.title, self.goal)
            .with_agent_kind(self.agent_type.parse().unwrap())
            .with_status(status)
            .with_steps(self.current_step, self.total_steps);
        task.plan = self.plan.into_iter().map(Into::into).collect();
        task.actions = self
            .actions
            .into_iter()
            .filter_map(|a| {
                let id = a.id.clone();
                match a.into_domain() {
                    Ok(action) => Some(action),
                    Err(e) => {
                        warn!("skipping malformed action {}: {}", id, e);
                        None
                    }
                }
            })
            .collect();
        task.error = self.error;
        task.result = self.result;
        task.is_proactive = self.is_proactive;
        task.parent_task_id = self.parent_task_id.map(|p| p.as_str().into());
        Ok(task)
    }
}

/// Convert a task list, skipping malformed entries.
pub fn tasks_into_domain(dtos: Vec<TaskDto>) -> Vec<AgentTask> {
    dtos.into_iter()
        .filter_map(|dto| {
            let id = dto.id.clone();
            match dto.into_domain() {
                Ok(task) => Some(task),
                Err(e) => {
                    warn!("skipping malformed task {}: {}", id, e);
                    None
                }
            }
        })
        .collect()
}

/// Convert the pending-approvals feed, skipping malformed entries.
pub fn actions_into_domain(dtos: Vec<ActionDto>) -> Vec<AgentTaskAction> {
    dtos.into_iter()
        .filter_map(|dto| {
            let id = dto.id.clone();
            match dto.into_domain() {
                Ok(action) => Some(action),
                Err(e) => {
                    warn!("skipping malformed action {}: {}", id, e);
                    None
                }
            }
        })
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveAgentDto {
    pub id: String,
    pub agent_type: String,
    pub title: String,
    pub status: String,
    #[serde(default)]
    pub current_step: u32,
    #[serde(default)]
    pub total_steps: u32,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub is_proactive: bool,
    #[serde(default)]
    pub parent_task_id: Option<String>,
}

impl ActiveAgentDto {
    pub fn into_domain(self) -> Result<ActiveAgentSummary, String> {
        Ok(ActiveAgentSummary {
            id: self.id.as_str().into(),
            agent_kind: self.agent_type.parse().unwrap(),
            title: self.title,
            status: self.status.parse()?,
            current_step: self.current_step,
            total_steps: self.total_steps,
            started_at: self.started_at,
            is_proactive: self.is_proactive,
            parent_task_id: self.parent_task_id.map(|p| p.as_str().into()),
        })
    }
}

/// Convert the live-activity feed, skipping malformed entries.
pub fn activity_into_domain(dtos: Vec<ActiveAgentDto>) -> Vec<ActiveAgentSummary> {
    dtos.into_iter()
        .filter_map(|dto| {
            let id = dto.id.clone();
            match dto.into_domain() {
                Ok(summary) => Some(summary),
                Err(e) => {
                    warn!("skipping malformed activity entry {}: {}", id, e);
                    None
                }
            }
        })
        .collect()
}
