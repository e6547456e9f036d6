//! Read-mostly mirror of backend-owned task state.
//!
//! [`TaskMirror`] holds the local view of every tracked task, reconciled
//! from poll snapshots. Reconciliation is monotonic: a snapshot whose
//! status would regress along the task state machine is skipped entirely,
//! because it describes an older point in time than what is already
//! mirrored. Terminal tasks are frozen.
//!
//! The mirror also carries the optimistic-command ledger: approve, reject,
//! and cancel commands are recorded as pending when issued, rolled back if
//! the send fails, and cleared when a later sync shows the backend moved
//! the action or task on.

use crate::ports::event_logger::{EventLogger, NoEventLogger, OrchestrationEvent};
use relay_domain::{
    ActionId, ActionStatus, ActiveAgentSummary, AgentTask, AgentTaskAction, TaskId, TaskStatus,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{debug, warn};

/// A command issued optimistically, awaiting backend confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingCommand {
    Approve,
    Reject { reason: String },
}

/// Point-in-time view of the mirror for observers
#[derive(Debug, Clone, Default)]
pub struct MirrorSnapshot {
    /// All tracked tasks, ordered by id
    pub tasks: Vec<AgentTask>,
    /// The selected task resolved by id, refreshed on every change
    pub selected: Option<AgentTask>,
    /// Latest live-activity feed
    pub activity: Vec<ActiveAgentSummary>,
    /// Pending-work indicator: awaiting-approval actions without a pending
    /// local command
    pub awaiting_approval: usize,
}

struct MirrorState {
    tasks: BTreeMap<TaskId, AgentTask>,
    pending_actions: HashMap<ActionId, PendingCommand>,
    pending_cancels: HashSet<TaskId>,
    selected: Option<TaskId>,
    activity: Vec<ActiveAgentSummary>,
}

/// Local mirror of backend task state with reactive snapshots
pub struct TaskMirror {
    state: Mutex<MirrorState>,
    tx: watch::Sender<MirrorSnapshot>,
    logger: Arc<dyn EventLogger>,
}

impl TaskMirror {
    pub fn new() -> Self {
        Self::with_logger(Arc::new(NoEventLogger))
    }

    pub fn with_logger(logger: Arc<dyn EventLogger>) -> Self {
        let (tx, _rx) = watch::channel(MirrorSnapshot::default());
        Self {
            state: Mutex::new(MirrorState {
                tasks: BTreeMap::new(),
                pending_actions: HashMap::new(),
                pending_cancels: HashSet::new(),
                selected: None,
                activity: Vec::new(),
            }),
            tx,
            logger,
        }
    }

    /// Subscribe to mirror changes.
    pub fn subscribe(&self) -> watch::Receiver<MirrorSnapshot> {
        self.tx.subscribe()
    }

    // ==================== Reconciliation ====================

    /// Merge a task-list poll result.
    pub fn apply_tasks(&self, tasks: Vec<AgentTask>) {
        let mut state = self.state.lock().unwrap();
        for task in tasks {
            Self::merge_task(&mut state, task);
        }
        Self::reconcile_pending(&mut state);
        self.publish(&state);
    }

    /// Merge a single task (detail fetch, includes plan and actions).
    pub fn apply_task(&self, task: AgentTask) {
        let mut state = self.state.lock().unwrap();
        Self::merge_task(&mut state, task);
        Self::reconcile_pending(&mut state);
        self.publish(&state);
    }

    /// Merge the cross-task pending-approvals feed. Actions are upserted
    /// into their owning task; actions for tasks the mirror has not seen
    /// yet are skipped (the next task-list poll brings the task).
    pub fn apply_pending_approvals(&self, actions: Vec<AgentTaskAction>) {
        let mut state = self.state.lock().unwrap();
        for action in actions {
            let Some(task) = state.tasks.get_mut(&action.task_id) else {
                debug!(
                    "skipping approval for unmirrored task {}",
                    action.task_id
                );
                continue;
            };
            Self::upsert_action(task, action);
        }
        Self::reconcile_pending(&mut state);
        self.publish(&state);
    }

    /// Replace the live-activity feed.
    pub fn apply_activity(&self, activity: Vec<ActiveAgentSummary>) {
        let mut state = self.state.lock().unwrap();
        state.activity = activity;
        self.publish(&state);
    }

    fn merge_task(state: &mut MirrorState, mut incoming: AgentTask) {
        // A parent link that closes a cycle is dropped; sub-task trees must
        // stay trees even on malformed poll data.
        if let Some(parent) = incoming.parent_task_id.clone()
            && Self::closes_cycle(state, &incoming.id, &parent)
        {
            warn!(
                "dropping cyclic parent link {} -> {}",
                incoming.id, parent
            );
            incoming.parent_task_id = None;
        }

        match state.tasks.get_mut(&incoming.id) {
            Some(existing) => {
                if !existing.status.may_supersede(&incoming.status) {
                    debug!(
                        "skipping stale snapshot for task {}: {} would regress {}",
                        incoming.id, incoming.status, existing.status
                    );
                    return;
                }
                // Summary-level polls carry no plan or actions; keep the
                // mirrored detail rather than wiping it.
                if incoming.plan.is_empty() && !existing.plan.is_empty() {
                    incoming.plan = std::mem::take(&mut existing.plan);
                }
                if incoming.actions.is_empty() && !existing.actions.is_empty() {
                    incoming.actions = std::mem::take(&mut existing.actions);
                }
                *existing = incoming;
            }
            None => {
                state.tasks.insert(incoming.id.clone(), incoming);
            }
        }
    }

    fn upsert_action(task: &mut AgentTask, incoming: AgentTaskAction) {
        match task.actions.iter_mut().find(|a| a.id == incoming.id) {
            Some(existing) => {
                if existing.status != incoming.status
                    && !existing.status.may_transition_to(&incoming.status)
                {
                    debug!(
                        "skipping invalid action transition for {}: {} -> {}",
                        incoming.id, existing.status, incoming.status
                    );
                    return;
                }
                *existing = incoming;
            }
            None => task.actions.push(incoming),
        }
    }

    /// Walk the parent chain from `parent`; if it reaches `id`, the new
    /// link would close a cycle. Bounded by the map size.
    fn closes_cycle(state: &MirrorState, id: &TaskId, parent: &TaskId) -> bool {
        if parent == id {
            return true;
        }
        let mut cursor = Some(parent.clone());
        let mut hops = 0;
        while let Some(current) = cursor {
            if &current == id {
                return true;
            }
            hops += 1;
            if hops > state.tasks.len() {
                return true;
            }
            cursor = state
                .tasks
                .get(&current)
                .and_then(|t| t.parent_task_id.clone());
        }
        false
    }

    /// Drop pending commands the backend has confirmed: an action command
    /// is done once the action is no longer awaiting approval, a cancel
    /// once the task reached a terminal state.
    fn reconcile_pending(state: &mut MirrorState) {
        let confirmed: Vec<ActionId> = state
            .pending_actions
            .keys()
            .filter(|id| {
                Self::find_action(state, id)
                    .map(|a| a.status != ActionStatus::AwaitingApproval)
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        for id in confirmed {
            debug!("pending command for action {} confirmed by sync", id);
            state.pending_actions.remove(&id);
        }

        let cancelled: Vec<TaskId> = state
            .pending_cancels
            .iter()
            .filter(|id| {
                state
                    .tasks
                    .get(*id)
                    .map(|t| t.is_terminal())
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        for id in cancelled {
            debug!("pending cancel for task {} confirmed by sync", id);
            state.pending_cancels.remove(&id);
        }
    }

    // ==================== Selection ====================

    /// Select a task by id (or clear the selection). The detail view always
    /// resolves through the id, so poll refreshes update it transparently.
    pub fn select(&self, id: Option<TaskId>) {
        let mut state = self.state.lock().unwrap();
        state.selected = id;
        self.publish(&state);
    }

    pub fn selected_id(&self) -> Option<TaskId> {
        self.state.lock().unwrap().selected.clone()
    }

    /// Resolve the selected task against the current mirror.
    pub fn selected_task(&self) -> Option<AgentTask> {
        let state = self.state.lock().unwrap();
        state
            .selected
            .as_ref()
            .and_then(|id| state.tasks.get(id))
            .cloned()
    }

    // ==================== Queries ====================

    pub fn task(&self, id: &TaskId) -> Option<AgentTask> {
        self.state.lock().unwrap().tasks.get(id).cloned()
    }

    pub fn tasks(&self) -> Vec<AgentTask> {
        self.state.lock().unwrap().tasks.values().cloned().collect()
    }

    pub fn activity(&self) -> Vec<ActiveAgentSummary> {
        self.state.lock().unwrap().activity.clone()
    }

    /// Look up an action's current mirrored status.
    pub fn action_status(&self, id: &ActionId) -> Option<ActionStatus> {
        let state = self.state.lock().unwrap();
        Self::find_action(&state, id).map(|a| a.status)
    }

    /// Pending-work indicator: actions awaiting approval that have no
    /// local command in flight.
    pub fn awaiting_approval_count(&self) -> usize {
        let state = self.state.lock().unwrap();
        Self::count_awaiting(&state)
    }

    fn find_action<'a>(state: &'a MirrorState, id: &ActionId) -> Option<&'a AgentTaskAction> {
        state
            .tasks
            .values()
            .flat_map(|t| t.actions.iter())
            .find(|a| &a.id == id)
    }

    fn count_awaiting(state: &MirrorState) -> usize {
        state
            .tasks
            .values()
            .flat_map(|t| t.actions.iter())
            .filter(|a| {
                a.is_awaiting_approval() && !state.pending_actions.contains_key(&a.id)
            })
            .count()
    }

    // ==================== Pending-command ledger ====================

    pub fn mark_pending_command(&self, id: ActionId, command: PendingCommand) {
        let mut state = self.state.lock().unwrap();
        state.pending_actions.insert(id, command);
        self.publish(&state);
    }

    /// Roll back an optimistic command whose send failed.
    pub fn clear_pending_command(&self, id: &ActionId) {
        let mut state = self.state.lock().unwrap();
        if state.pending_actions.remove(id).is_some() {
            self.logger.log(OrchestrationEvent::new(
                "command_rolled_back",
                serde_json::json!({ "action_id": id.as_str() }),
            ));
        }
        self.publish(&state);
    }

    pub fn has_pending_command(&self, id: &ActionId) -> bool {
        self.state.lock().unwrap().pending_actions.contains_key(id)
    }

    pub fn mark_pending_cancel(&self, id: TaskId) {
        let mut state = self.state.lock().unwrap();
        state.pending_cancels.insert(id);
        self.publish(&state);
    }

    pub fn clear_pending_cancel(&self, id: &TaskId) {
        let mut state = self.state.lock().unwrap();
        state.pending_cancels.remove(id);
        self.publish(&state);
    }

    pub fn has_pending_cancel(&self, id: &TaskId) -> bool {
        self.state.lock().unwrap().pending_cancels.contains(id)
    }

    fn publish(&self, state: &MirrorState) {
        let _ = self.tx.send(MirrorSnapshot {
            tasks: state.tasks.values().cloned().collect(),
            selected: state
                .selected
                .as_ref()
                .and_then(|id| state.tasks.get(id))
                .cloned(),
            activity: state.activity.clone(),
            awaiting_approval: Self::count_awaiting(state),
        });
    }
}

impl Default for TaskMirror {
    fn default() -> Self {
        Self::new()
    }
}
