//! Per-agent response value objects

use crate::core::agent_kind::AgentKind;
use serde::{Deserialize, Serialize};

/// Status of one agent's contribution to a turn
///
/// `Loading` is only legal while the owning turn is the active (in-flight)
/// turn; a turn entering history has exactly one terminal status per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Loading,
    Success,
    Error,
}

impl ResponseStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ResponseStatus::Success | ResponseStatus::Error)
    }

    pub fn as_str(&self) -> &str {
        match self {
            ResponseStatus::Loading => "loading",
            ResponseStatus::Success => "success",
            ResponseStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Provider-side execution details attached to a response
///
/// Every field is optional: the backend reports what it knows, and the
/// orchestration core backfills `latency_ms` from its own clock when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResponseMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_cents: Option<f64>,
}

impl ResponseMetadata {
    /// Fill `latency_ms` with a locally measured value if the backend
    /// did not report one.
    pub fn with_measured_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms.get_or_insert(latency_ms);
        self
    }
}

/// One agent's contribution to a turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    /// The agent that produced (or will produce) this response
    pub agent: AgentKind,
    pub status: ResponseStatus,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentResponse {
    /// Creates the placeholder slot for an agent whose call is in flight.
    pub fn loading(agent: AgentKind) -> Self {
        Self {
            agent,
            status: ResponseStatus::Loading,
            content: String::new(),
            metadata: None,
            error: None,
        }
    }

    /// Creates a successful response.
    pub fn success(agent: AgentKind, content: impl Into<String>) -> Self {
        Self {
            agent,
            status: ResponseStatus::Success,
            content: content.into(),
            metadata: None,
            error: None,
        }
    }

    /// Creates a failed response. The error never aborts sibling requests;
    /// it is captured here and nowhere else.
    pub fn failure(agent: AgentKind, error: impl Into<String>) -> Self {
        Self {
            agent,
            status: ResponseStatus::Error,
            content: String::new(),
            metadata: None,
            error: Some(error.into()),
        }
    }

    pub fn with_metadata(mut self, metadata: ResponseMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn is_settled(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_is_not_settled() {
        let r = AgentResponse::loading(AgentKind::Performance);
        assert!(!r.is_settled());
        assert_eq!(r.status, ResponseStatus::Loading);
    }

    #[test]
    fn test_success_response() {
        let r = AgentResponse::success(AgentKind::Coaching, "Try weekly 1:1s");
        assert!(r.is_settled());
        assert!(r.is_success());
        assert!(r.error.is_none());
    }

    #[test]
    fn test_failure_captures_error() {
        let r = AgentResponse::failure(AgentKind::Goals, "connection refused");
        assert!(r.is_settled());
        assert!(!r.is_success());
        assert_eq!(r.error.as_deref(), Some("connection refused"));
        assert!(r.content.is_empty());
    }

    #[test]
    fn test_metadata_latency_backfill() {
        let meta = ResponseMetadata {
            latency_ms: Some(120),
            ..Default::default()
        };
        // Reported latency wins over the measured one
        assert_eq!(meta.with_measured_latency(999).latency_ms, Some(120));

        let meta = ResponseMetadata::default().with_measured_latency(42);
        assert_eq!(meta.latency_ms, Some(42));
    }
}
