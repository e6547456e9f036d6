//! Agent kind value object
//!
//! Agent identifiers arrive as open-ended strings from configuration, CLI
//! arguments, and backend payloads. [`AgentKind`] closes them over the known
//! specialist set: parsing never fails, but anything unrecognized lands in
//! [`AgentKind::Unknown`] so callers can fail closed instead of silently
//! routing to a nonexistent agent.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A specialized AI agent addressable by the orchestration core (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgentKind {
    /// Performance-review analysis and summaries
    Performance,
    /// Manager coaching and 1:1 guidance
    Coaching,
    /// Goal setting and OKR tracking
    Goals,
    /// Feedback drafting and aggregation
    Feedback,
    /// Engagement-survey interpretation
    Engagement,
    /// People-analytics queries
    Analytics,
    /// The coordinating agent that fans work across a named agent set.
    /// Reserved: produced by coordinate mode, never directly selectable.
    Coordinator,
    /// Unrecognized identifier, preserved verbatim
    Unknown(String),
}

impl AgentKind {
    /// Get the string identifier for this agent kind
    pub fn as_str(&self) -> &str {
        match self {
            AgentKind::Performance => "performance",
            AgentKind::Coaching => "coaching",
            AgentKind::Goals => "goals",
            AgentKind::Feedback => "feedback",
            AgentKind::Engagement => "engagement",
            AgentKind::Analytics => "analytics",
            AgentKind::Coordinator => "coordinator",
            AgentKind::Unknown(s) => s,
        }
    }

    /// All kinds a user may select for a broadcast or coordinate submission
    pub fn selectable() -> Vec<AgentKind> {
        vec![
            AgentKind::Performance,
            AgentKind::Coaching,
            AgentKind::Goals,
            AgentKind::Feedback,
            AgentKind::Engagement,
            AgentKind::Analytics,
        ]
    }

    /// Check if this kind is one of the known specialist agents
    pub fn is_known(&self) -> bool {
        !matches!(self, AgentKind::Unknown(_))
    }

    /// Check if this is the reserved coordinator kind
    pub fn is_coordinator(&self) -> bool {
        matches!(self, AgentKind::Coordinator)
    }

    /// Check if a user may include this kind in an agent selection
    pub fn is_selectable(&self) -> bool {
        self.is_known() && !self.is_coordinator()
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AgentKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "performance" => AgentKind::Performance,
            "coaching" => AgentKind::Coaching,
            "goals" => AgentKind::Goals,
            "feedback" => AgentKind::Feedback,
            "engagement" => AgentKind::Engagement,
            "analytics" => AgentKind::Analytics,
            "coordinator" => AgentKind::Coordinator,
            other => AgentKind::Unknown(other.to_string()),
        })
    }
}

impl Serialize for AgentKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AgentKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        for kind in AgentKind::selectable() {
            let s = kind.to_string();
            let parsed: AgentKind = s.parse().unwrap();
            assert_eq!(kind, parsed);
        }
    }

    #[test]
    fn test_unknown_kind_preserved() {
        let kind: AgentKind = "wellness".parse().unwrap();
        assert_eq!(kind, AgentKind::Unknown("wellness".to_string()));
        assert_eq!(kind.to_string(), "wellness");
        assert!(!kind.is_known());
        assert!(!kind.is_selectable());
    }

    #[test]
    fn test_coordinator_not_selectable() {
        let kind: AgentKind = "coordinator".parse().unwrap();
        assert!(kind.is_known());
        assert!(kind.is_coordinator());
        assert!(!kind.is_selectable());
    }

    #[test]
    fn test_selectable_kinds_are_selectable() {
        for kind in AgentKind::selectable() {
            assert!(kind.is_selectable(), "{kind} should be selectable");
        }
    }

    #[test]
    fn test_serde_string_form() {
        let json = serde_json::to_string(&AgentKind::Coaching).unwrap();
        assert_eq!(json, "\"coaching\"");
        let back: AgentKind = serde_json::from_str("\"analytics\"").unwrap();
        assert_eq!(back, AgentKind::Analytics);
    }
}
