//! Application layer for agent-relay
//!
//! This crate contains use cases and port definitions for the agent task
//! orchestration core. It depends only on the domain layer.
//!
//! The four orchestration components live here:
//! - [`use_cases::submit_turn`] — broadcast fan-out and coordinate-mode
//!   routing of a user message
//! - [`use_cases::approval_gate`] — approve/reject commands for actions
//!   paused on human approval
//! - [`use_cases::task_sync`] — periodic reconciliation of the task mirror
//!   against the backend
//! - [`use_cases::turn_feed`] / [`use_cases::task_mirror`] — the shared
//!   reactive state those components publish into

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    agent_gateway::{AgentGateway, ChatReply, GatewayError},
    event_logger::{EventLogger, NoEventLogger, OrchestrationEvent},
    progress::{NoTurnProgress, TurnProgressNotifier},
    task_backend::{TaskBackend, TaskBackendError},
};
pub use use_cases::approval_gate::{ApprovalError, ApprovalGate, ApprovalOutcome};
pub use use_cases::submit_turn::{SubmitTurnError, SubmitTurnInput, SubmitTurnUseCase};
pub use use_cases::task_mirror::{MirrorSnapshot, PendingCommand, TaskMirror};
pub use use_cases::task_sync::{CancelOutcome, SyncIntervals, TaskLifecycleSync};
pub use use_cases::turn_feed::{TurnFeed, TurnSnapshot};
