//! Task status state machine
//!
//! Backend-reported statuses drive every transition; the client applies them
//! through [`TaskStatus::may_supersede`], which rejects regressions so
//! out-of-order poll responses can never move a task backwards.

use serde::{Deserialize, Serialize};

/// Status of an agent task
///
/// Forward chain: `pending → planning → executing ⇄ awaiting_approval →
/// completed | failed`. `cancelled` is reachable from any non-terminal
/// state via an explicit cancel command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    Planning,
    Executing,
    AwaitingApproval,
    Completed,
    Failed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Planning => "planning",
            TaskStatus::Executing => "executing",
            TaskStatus::AwaitingApproval => "awaiting_approval",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Cancelled
        )
    }

    /// Position in the forward transition chain. `Executing` and
    /// `AwaitingApproval` are mutually reachable and share a rank; they are
    /// not ordered against each other.
    pub fn ordinal(&self) -> u8 {
        match self {
            TaskStatus::Pending => 0,
            TaskStatus::Planning => 1,
            TaskStatus::Executing | TaskStatus::AwaitingApproval => 2,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Cancelled => 3,
        }
    }

    /// Monotonic merge rule for poll reconciliation.
    ///
    /// A terminal status accepts only an identical re-report (so result and
    /// error fields can refresh). Otherwise an incoming status is accepted
    /// iff it does not regress along the ordinal chain; equal-rank reports
    /// are accepted so step progress refreshes within a status and
    /// executing/awaiting_approval can flip either way.
    pub fn may_supersede(&self, incoming: &TaskStatus) -> bool {
        if self.is_terminal() {
            return self == incoming;
        }
        incoming.ordinal() >= self.ordinal()
    }

    /// Whether a cancel command is meaningful in this state. Pending tasks
    /// have nothing to stop yet and terminal tasks nothing to stop anymore;
    /// both make cancel a client-side no-op.
    pub fn is_cancellable(&self) -> bool {
        matches!(
            self,
            TaskStatus::Planning | TaskStatus::Executing | TaskStatus::AwaitingApproval
        )
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "planning" => Ok(TaskStatus::Planning),
            "executing" => Ok(TaskStatus::Executing),
            "awaiting_approval" => Ok(TaskStatus::AwaitingApproval),
            "completed" => Ok(TaskStatus::Completed),
            "failed" => Ok(TaskStatus::Failed),
            "cancelled" => Ok(TaskStatus::Cancelled),
            other => Err(format!("unknown task status: {other}")),
        }
    }
}
