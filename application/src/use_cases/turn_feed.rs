//! Reactive turn state: the single active-turn slot plus history.
//!
//! [`TurnFeed`] owns every `ConversationTurn` the orchestration core
//! creates. There is exactly one active slot: claiming it while occupied
//! fails, which is the mutual exclusion that prevents overlapping turns.
//! Observers subscribe to a `watch` channel and receive a fresh
//! [`TurnSnapshot`] on every change; a turn only ever appears in history
//! once all of its responses are terminal, and the move is atomic.

use relay_domain::{AgentKind, AgentResponse, ConversationTurn, TurnId};
use std::sync::Mutex;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Returned when a second submission arrives while a turn is in flight
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("a turn is already in flight")]
pub struct TurnInFlight;

/// Point-in-time view of the feed for observers
#[derive(Debug, Clone, Default)]
pub struct TurnSnapshot {
    /// The in-flight turn, if any; its responses may still be loading
    pub active: Option<ConversationTurn>,
    /// Settled turns, most-recent-last
    pub history: Vec<ConversationTurn>,
}

struct FeedState {
    active: Option<ConversationTurn>,
    history: Vec<ConversationTurn>,
    seq: u64,
}

/// Owner of the active-turn slot and the in-memory turn history
pub struct TurnFeed {
    state: Mutex<FeedState>,
    tx: watch::Sender<TurnSnapshot>,
}

impl TurnFeed {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(TurnSnapshot::default());
        Self {
            state: Mutex::new(FeedState {
                active: None,
                history: Vec::new(),
                seq: 0,
            }),
            tx,
        }
    }

    /// Subscribe to feed changes. The receiver always holds the latest
    /// snapshot.
    pub fn subscribe(&self) -> watch::Receiver<TurnSnapshot> {
        self.tx.subscribe()
    }

    /// Claim the active slot for a broadcast turn with one loading slot per
    /// agent. Fails if a turn is already in flight; the active turn is
    /// unaffected.
    pub fn begin_broadcast(
        &self,
        message: &str,
        agents: &[AgentKind],
    ) -> Result<TurnId, TurnInFlight> {
        self.begin_with(|id| ConversationTurn::broadcast(id, message, agents))
    }

    /// Claim the active slot for a coordinate turn with a single
    /// coordinator slot.
    pub fn begin_coordinate(&self, message: &str) -> Result<TurnId, TurnInFlight> {
        self.begin_with(|id| ConversationTurn::coordinate(id, message))
    }

    fn begin_with(
        &self,
        build: impl FnOnce(TurnId) -> ConversationTurn,
    ) -> Result<TurnId, TurnInFlight> {
        let mut state = self.state.lock().unwrap();
        if state.active.is_some() {
            return Err(TurnInFlight);
        }
        state.seq += 1;
        let id = TurnId::new(format!("turn-{}", state.seq));
        let turn = build(id.clone());
        state.active = Some(turn);
        self.publish(&state);
        Ok(id)
    }

    /// Settle one agent's slot on the active turn, leaving siblings
    /// untouched, and republish so observers see incremental progress.
    /// Returns false if the active turn does not match (a late settle for
    /// an already-finished turn is dropped).
    pub fn record(&self, id: &TurnId, response: AgentResponse) -> bool {
        let mut state = self.state.lock().unwrap();
        let applied = match state.active.as_mut() {
            Some(turn) if &turn.id == id => {
                let agent = response.agent.clone();
                let applied = turn.set_response(response);
                if !applied {
                    warn!("dropping response for {agent}: no slot in turn {id}");
                }
                applied
            }
            _ => {
                debug!("dropping response for finished turn {id}");
                false
            }
        };
        if applied {
            self.publish(&state);
        }
        applied
    }

    /// Atomically move the settled active turn to history. Returns the
    /// completed turn, or None if the id does not match the active turn or
    /// a slot is still loading (the turn then stays active).
    pub fn finish(&self, id: &TurnId) -> Option<ConversationTurn> {
        let mut state = self.state.lock().unwrap();
        let settled = matches!(&state.active, Some(turn) if &turn.id == id && turn.is_settled());
        if !settled {
            warn!("refusing to finish turn {id}: not active or not settled");
            return None;
        }
        let turn = state.active.take()?;
        state.history.push(turn.clone());
        self.publish(&state);
        Some(turn)
    }

    /// The in-flight turn, if any.
    pub fn active(&self) -> Option<ConversationTurn> {
        self.state.lock().unwrap().active.clone()
    }

    /// Settled turns, most-recent-last.
    pub fn history(&self) -> Vec<ConversationTurn> {
        self.state.lock().unwrap().history.clone()
    }

    /// Current snapshot without subscribing.
    pub fn snapshot(&self) -> TurnSnapshot {
        let state = self.state.lock().unwrap();
        TurnSnapshot {
            active: state.active.clone(),
            history: state.history.clone(),
        }
    }

    fn publish(&self, state: &FeedState) {
        let _ = self.tx.send(TurnSnapshot {
            active: state.active.clone(),
            history: state.history.clone(),
        });
    }
}

impl Default for TurnFeed {
    fn default() -> Self {
        Self::new()
    }
}
