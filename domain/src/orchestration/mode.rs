//! Dispatch mode definitions.
//!
//! Defines [`DispatchMode`], the single user-facing routing axis:
//! - Broadcast: every selected agent answers independently
//! - Coordinate: one coordinating agent decomposes across the set

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a submission is routed across the selected agents.
///
/// A given user message is routed through exactly one mode, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// Each selected agent receives the message and replies independently
    #[default]
    Broadcast,
    /// A single coordinating agent fans work across the named set and
    /// returns one consolidated reply
    Coordinate,
}

impl DispatchMode {
    /// Get a human-readable description of this mode
    pub fn description(&self) -> &'static str {
        match self {
            DispatchMode::Broadcast => {
                "Broadcast: every selected agent answers independently"
            }
            DispatchMode::Coordinate => {
                "Coordinate: one coordinating agent merges work across the set"
            }
        }
    }

    /// Check if this is coordinate mode
    pub fn is_coordinate(&self) -> bool {
        matches!(self, DispatchMode::Coordinate)
    }
}

impl fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchMode::Broadcast => write!(f, "broadcast"),
            DispatchMode::Coordinate => write!(f, "coordinate"),
        }
    }
}

impl std::str::FromStr for DispatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "broadcast" | "b" => Ok(DispatchMode::Broadcast),
            "coordinate" | "coord" | "c" => Ok(DispatchMode::Coordinate),
            _ => Err(format!("Invalid DispatchMode: {}", s)),
        }
    }
}
