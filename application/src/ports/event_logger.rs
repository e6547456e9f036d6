//! Port for structured orchestration-event logging.
//!
//! Defines the [`EventLogger`] trait for recording orchestration events
//! (turn submissions, per-agent responses, approval commands, sync results)
//! to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the
//! orchestration transcript in a machine-readable format (JSONL).

use serde_json::Value;

/// A structured orchestration event for logging.
pub struct OrchestrationEvent {
    /// Event type identifier (e.g., "turn_submitted", "approval_command").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl OrchestrationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging orchestration events to a structured log.
///
/// Implementations write each event as a single record (e.g., one JSONL
/// line). The `log` method is intentionally synchronous and non-fallible to
/// avoid disrupting the main execution flow — logging failures are silently
/// ignored.
pub trait EventLogger: Send + Sync {
    /// Record an orchestration event.
    fn log(&self, event: OrchestrationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoEventLogger;

impl EventLogger for NoEventLogger {
    fn log(&self, _event: OrchestrationEvent) {}
}
