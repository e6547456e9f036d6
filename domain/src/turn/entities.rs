//! Conversation turn entity

use crate::core::agent_kind::AgentKind;
use crate::turn::response::{AgentResponse, ResponseStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a conversation turn (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TurnId(String);

impl TurnId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TurnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TurnId {
    fn from(s: &str) -> Self {
        TurnId::new(s)
    }
}

/// One round of a multi-agent exchange (Entity)
///
/// Created when the user submits a message with at least one agent selected.
/// Each selected agent owns exactly one response slot; settling one slot
/// never touches a sibling. The turn is immutable once every slot is
/// terminal and it has moved to history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: TurnId,
    pub user_message: String,
    pub timestamp: DateTime<Utc>,
    pub responses: Vec<AgentResponse>,
}

impl ConversationTurn {
    /// Create a broadcast turn with one loading slot per agent.
    pub fn broadcast(
        id: impl Into<TurnId>,
        user_message: impl Into<String>,
        agents: &[AgentKind],
    ) -> Self {
        Self {
            id: id.into(),
            user_message: user_message.into(),
            timestamp: Utc::now(),
            responses: agents.iter().cloned().map(AgentResponse::loading).collect(),
        }
    }

    /// Create a coordinate turn with a single loading slot for the
    /// coordinator.
    pub fn coordinate(id: impl Into<TurnId>, user_message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_message: user_message.into(),
            timestamp: Utc::now(),
            responses: vec![AgentResponse::loading(AgentKind::Coordinator)],
        }
    }

    /// Replace the slot belonging to `response.agent`, leaving siblings
    /// untouched. Returns false if no slot matches (the response is dropped;
    /// a settling call for an agent outside the turn cannot corrupt it).
    pub fn set_response(&mut self, response: AgentResponse) -> bool {
        match self.responses.iter_mut().find(|r| r.agent == response.agent) {
            Some(slot) => {
                *slot = response;
                true
            }
            None => false,
        }
    }

    /// Look up one agent's response slot.
    pub fn response_for(&self, agent: &AgentKind) -> Option<&AgentResponse> {
        self.responses.iter().find(|r| &r.agent == agent)
    }

    /// True once every response slot has a terminal status.
    pub fn is_settled(&self) -> bool {
        self.responses.iter().all(|r| r.status.is_terminal())
    }

    /// Count of slots still in flight.
    pub fn loading_count(&self) -> usize {
        self.responses
            .iter()
            .filter(|r| r.status == ResponseStatus::Loading)
            .count()
    }

    /// Count of settled slots with the given status.
    pub fn count_with_status(&self, status: ResponseStatus) -> usize {
        self.responses.iter().filter(|r| r.status == status).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_agents() -> Vec<AgentKind> {
        vec![AgentKind::Performance, AgentKind::Coaching, AgentKind::Goals]
    }

    #[test]
    fn test_broadcast_turn_starts_loading() {
        let turn = ConversationTurn::broadcast("turn-1", "What is attrition risk?", &three_agents());
        assert_eq!(turn.responses.len(), 3);
        assert_eq!(turn.loading_count(), 3);
        assert!(!turn.is_settled());
    }

    #[test]
    fn test_set_response_updates_only_matching_slot() {
        let mut turn = ConversationTurn::broadcast("turn-1", "q", &three_agents());
        let updated = turn.set_response(AgentResponse::success(AgentKind::Coaching, "answer"));
        assert!(updated);
        assert!(turn.response_for(&AgentKind::Coaching).unwrap().is_success());
        assert_eq!(
            turn.response_for(&AgentKind::Performance).unwrap().status,
            ResponseStatus::Loading
        );
        assert_eq!(turn.loading_count(), 2);
    }

    #[test]
    fn test_set_response_unknown_agent_is_dropped() {
        let mut turn = ConversationTurn::broadcast("turn-1", "q", &three_agents());
        let updated = turn.set_response(AgentResponse::success(AgentKind::Analytics, "stray"));
        assert!(!updated);
        assert_eq!(turn.loading_count(), 3);
    }

    #[test]
    fn test_settles_once_all_terminal() {
        let mut turn = ConversationTurn::broadcast("turn-1", "q", &three_agents());
        turn.set_response(AgentResponse::success(AgentKind::Performance, "a"));
        turn.set_response(AgentResponse::failure(AgentKind::Coaching, "timeout"));
        assert!(!turn.is_settled());
        turn.set_response(AgentResponse::success(AgentKind::Goals, "b"));
        assert!(turn.is_settled());
        assert_eq!(turn.count_with_status(ResponseStatus::Success), 2);
        assert_eq!(turn.count_with_status(ResponseStatus::Error), 1);
    }

    #[test]
    fn test_coordinate_turn_has_single_coordinator_slot() {
        let turn = ConversationTurn::coordinate("turn-2", "Draft Q3 goals");
        assert_eq!(turn.responses.len(), 1);
        assert_eq!(turn.responses[0].agent, AgentKind::Coordinator);
    }
}
