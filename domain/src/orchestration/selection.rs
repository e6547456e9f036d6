//! Agent selection value object
//!
//! The validated set of agents a submission targets. Construction fails
//! closed: unknown identifiers and the reserved coordinator kind are
//! rejected rather than silently dropped.

use crate::core::agent_kind::AgentKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of agents a single submission may target
pub const MAX_AGENTS: usize = 5;

/// Why a selection was refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("At least one agent must be selected")]
    Empty,

    #[error("At most {MAX_AGENTS} agents may be selected, got {0}")]
    TooMany(usize),

    #[error("Unknown agent kind: {0}")]
    UnknownAgent(String),

    #[error("The coordinator agent cannot be selected directly")]
    CoordinatorNotSelectable,
}

/// A validated, deduplicated, order-preserving agent set (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSelection {
    agents: Vec<AgentKind>,
}

impl AgentSelection {
    /// Validate and construct a selection. Duplicates are collapsed while
    /// preserving first-seen order; the size bound applies after dedup.
    pub fn new(agents: impl IntoIterator<Item = AgentKind>) -> Result<Self, SelectionError> {
        let mut unique: Vec<AgentKind> = Vec::new();
        for agent in agents {
            match &agent {
                AgentKind::Unknown(name) => {
                    return Err(SelectionError::UnknownAgent(name.clone()));
                }
                AgentKind::Coordinator => {
                    return Err(SelectionError::CoordinatorNotSelectable);
                }
                _ => {}
            }
            if !unique.contains(&agent) {
                unique.push(agent);
            }
        }
        if unique.is_empty() {
            return Err(SelectionError::Empty);
        }
        if unique.len() > MAX_AGENTS {
            return Err(SelectionError::TooMany(unique.len()));
        }
        Ok(Self { agents: unique })
    }

    /// Parse a selection from raw string identifiers.
    pub fn parse(names: &[String]) -> Result<Self, SelectionError> {
        Self::new(names.iter().map(|n| n.parse::<AgentKind>().unwrap()))
    }

    pub fn agents(&self) -> &[AgentKind] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn contains(&self, agent: &AgentKind) -> bool {
        self.agents.contains(agent)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AgentKind> {
        self.agents.iter()
    }
}

impl std::fmt::Display for AgentSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.agents.iter().map(|a| a.as_str()).collect();
        write!(f, "{}", names.join(", "))
    }
}
