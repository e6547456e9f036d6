//! Periodic task-state synchronization.
//!
//! Keeps the [`TaskMirror`] current by polling the backend on two fixed
//! cadences: the task list (with selected-task detail and the pending
//! approvals feed) and the live-activity feed. Each loop awaits its poll
//! before scheduling the next tick, so overlapping requests for the same
//! resource cannot pile up behind a slow backend. A failed poll is logged
//! and retried on the next tick; the last-known state stays visible.

use crate::ports::event_logger::{EventLogger, NoEventLogger, OrchestrationEvent};
use crate::ports::task_backend::{TaskBackend, TaskBackendError};
use crate::use_cases::task_mirror::TaskMirror;
use relay_domain::TaskId;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Polling cadences for the two backend feeds
#[derive(Debug, Clone, Copy)]
pub struct SyncIntervals {
    pub tasks: Duration,
    pub activity: Duration,
}

impl Default for SyncIntervals {
    fn default() -> Self {
        Self {
            tasks: Duration::from_secs(10),
            activity: Duration::from_secs(8),
        }
    }
}

/// What a cancel call actually did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The cancel command was sent to the backend
    Requested,
    /// The task was not in a cancellable state; nothing was sent
    NoEffect,
}

/// Background synchronization of backend task state into the mirror
pub struct TaskLifecycleSync<B: TaskBackend + 'static> {
    backend: Arc<B>,
    mirror: Arc<TaskMirror>,
    intervals: SyncIntervals,
    logger: Arc<dyn EventLogger>,
}

impl<B: TaskBackend + 'static> TaskLifecycleSync<B> {
    pub fn new(backend: Arc<B>, mirror: Arc<TaskMirror>) -> Self {
        Self {
            backend,
            mirror,
            intervals: SyncIntervals::default(),
            logger: Arc::new(NoEventLogger),
        }
    }

    pub fn with_intervals(mut self, intervals: SyncIntervals) -> Self {
        self.intervals = intervals;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn EventLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn mirror(&self) -> &Arc<TaskMirror> {
        &self.mirror
    }

    /// Run both polling loops until the token is cancelled.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(
            "Task sync running (tasks every {:?}, activity every {:?})",
            self.intervals.tasks, self.intervals.activity
        );
        tokio::join!(
            self.run_task_loop(&cancel),
            self.run_activity_loop(&cancel)
        );
        info!("Task sync stopped");
    }

    async fn run_task_loop(&self, cancel: &CancellationToken) {
        let mut interval = tokio::time::interval(self.intervals.tasks);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    // The poll is awaited here, so at most one task-list
                    // request is in flight at any time.
                    if let Err(e) = self.poll_tasks_once().await {
                        warn!("Task poll failed, keeping last-known state: {}", e);
                    }
                }
            }
        }
    }

    async fn run_activity_loop(&self, cancel: &CancellationToken) {
        let mut interval = tokio::time::interval(self.intervals.activity);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    if let Err(e) = self.poll_activity_once().await {
                        warn!("Activity poll failed, keeping last-known state: {}", e);
                    }
                }
            }
        }
    }

    /// One round of the task-list feed: list, selected-task detail,
    /// pending approvals.
    pub async fn poll_tasks_once(&self) -> Result<(), TaskBackendError> {
        let tasks = self.backend.list_tasks().await?;
        let count = tasks.len();
        self.mirror.apply_tasks(tasks);

        if let Some(id) = self.mirror.selected_id() {
            match self.backend.get_task(&id).await {
                Ok(task) => self.mirror.apply_task(task),
                Err(TaskBackendError::NotFound(_)) => {
                    debug!("selected task {} no longer exists on the backend", id);
                }
                Err(e) => return Err(e),
            }
        }

        let approvals = self.backend.pending_approvals().await?;
        self.mirror.apply_pending_approvals(approvals);

        self.logger.log(OrchestrationEvent::new(
            "sync_applied",
            serde_json::json!({ "tasks": count }),
        ));
        Ok(())
    }

    /// One round of the live-activity feed.
    pub async fn poll_activity_once(&self) -> Result<(), TaskBackendError> {
        let activity = self.backend.active_agents().await?;
        self.mirror.apply_activity(activity);
        Ok(())
    }

    /// One full synchronous round, for one-shot commands.
    pub async fn refresh_once(&self) -> Result<(), TaskBackendError> {
        self.poll_tasks_once().await?;
        self.poll_activity_once().await
    }

    /// Cancel a task. Only meaningful while the mirrored status is
    /// planning, executing, or awaiting approval; anything else is a
    /// client-side no-op and nothing is sent.
    pub async fn cancel(&self, id: &TaskId) -> Result<CancelOutcome, TaskBackendError> {
        let cancellable = self
            .mirror
            .task(id)
            .map(|t| t.is_cancellable())
            .unwrap_or(false);
        if !cancellable || self.mirror.has_pending_cancel(id) {
            debug!("cancel on {} has no effect", id);
            return Ok(CancelOutcome::NoEffect);
        }

        self.mirror.mark_pending_cancel(id.clone());
        match self.backend.cancel_task(id).await {
            Ok(()) => {
                info!("Requested cancel for task {}", id);
                self.logger.log(OrchestrationEvent::new(
                    "cancel_command",
                    serde_json::json!({ "task_id": id.as_str() }),
                ));
                Ok(CancelOutcome::Requested)
            }
            Err(e) => {
                warn!("Cancel for {} failed, rolling back: {}", id, e);
                self.mirror.clear_pending_cancel(id);
                Err(e)
            }
        }
    }
}
