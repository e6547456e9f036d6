//! Progress notification port
//!
//! Defines the interface for reporting progress while a turn's agent calls
//! are in flight.

use relay_domain::{AgentKind, DispatchMode};

/// Callback for progress updates during turn dispatch
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console, progress bars, etc.)
pub trait TurnProgressNotifier: Send + Sync {
    /// Called when a turn begins dispatching, with the slot count
    fn on_dispatch_start(&self, mode: &DispatchMode, total: usize);

    /// Called as each agent's call settles
    fn on_agent_settled(&self, agent: &AgentKind, success: bool);

    /// Called once every slot is terminal and the turn moves to history
    fn on_dispatch_complete(&self);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoTurnProgress;

impl TurnProgressNotifier for NoTurnProgress {
    fn on_dispatch_start(&self, _mode: &DispatchMode, _total: usize) {}
    fn on_agent_settled(&self, _agent: &AgentKind, _success: bool) {}
    fn on_dispatch_complete(&self) {}
}
