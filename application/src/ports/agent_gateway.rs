//! Agent gateway port
//!
//! Defines the interface for sending chat messages to the remote
//! agent-execution backend. One call per agent for broadcast turns; one
//! call naming the full agent set for coordinate turns.

use async_trait::async_trait;
use relay_domain::{AgentKind, ResponseMetadata};
use thiserror::Error;

/// Errors that can occur while talking to the backend
///
/// A timeout is a transport failure like any other: it settles the calling
/// agent's response slot and is never escalated past it.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Backend returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Invalid response from backend: {0}")]
    InvalidResponse(String),

    #[error("Gateway error: {0}")]
    Other(String),
}

/// A single agent's reply to a chat request
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub content: String,
    /// Conversation continuity token, echoed on follow-up requests
    pub conversation_id: Option<String>,
    pub metadata: Option<ResponseMetadata>,
    /// Backend-suggested follow-up prompts
    pub suggested_actions: Vec<String>,
}

impl ChatReply {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            conversation_id: None,
            metadata: None,
            suggested_actions: Vec::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: ResponseMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Gateway for agent chat traffic
///
/// This port defines how the orchestration core reaches individual agents.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait AgentGateway: Send + Sync {
    /// Send one message to one agent.
    async fn chat(
        &self,
        message: &str,
        agent: &AgentKind,
        conversation_id: Option<&str>,
    ) -> Result<ChatReply, GatewayError>;

    /// Send one message to the coordinating endpoint, naming the agent set
    /// it should decompose across. Returns exactly one consolidated reply;
    /// sub-agent visibility is the backend's concern.
    async fn coordinate_chat(
        &self,
        message: &str,
        agents: &[AgentKind],
    ) -> Result<ChatReply, GatewayError>;
}
