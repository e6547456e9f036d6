//! Default agent selection section of the config file

use relay_domain::{AgentKind, ConfigIssue, DispatchMode};
use serde::{Deserialize, Serialize};

/// `[agents]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentsConfig {
    /// Agents used when the CLI is invoked without `--agent`
    pub default: Vec<String>,
    /// Default dispatch mode: "broadcast" or "coordinate"
    pub mode: String,
}

impl Default for FileAgentsConfig {
    fn default() -> Self {
        Self {
            default: vec!["performance".to_string(), "coaching".to_string()],
            mode: "broadcast".to_string(),
        }
    }
}

impl FileAgentsConfig {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let (_, mut issues) = self.parse_agents();
        issues.extend(self.parse_mode().1);
        issues
    }

    /// Parse the default selection, excluding unknown or reserved names
    /// (fail closed) with one issue per exclusion.
    pub fn parse_agents(&self) -> (Vec<AgentKind>, Vec<ConfigIssue>) {
        let mut kinds = Vec::new();
        let mut issues = Vec::new();
        for name in &self.default {
            let kind: AgentKind = name.parse().unwrap();
            if kind.is_selectable() {
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            } else {
                issues.push(ConfigIssue::warning(
                    "agents.default",
                    format!("'{name}' is not a selectable agent kind, excluded"),
                ));
            }
        }
        (kinds, issues)
    }

    /// Parse the default mode, falling back to broadcast on a bad value.
    pub fn parse_mode(&self) -> (DispatchMode, Vec<ConfigIssue>) {
        match self.mode.parse::<DispatchMode>() {
            Ok(mode) => (mode, Vec::new()),
            Err(_) => (
                DispatchMode::Broadcast,
                vec![ConfigIssue::warning(
                    "agents.mode",
                    format!("'{}' is not a dispatch mode, using broadcast", self.mode),
                )],
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selection_parses() {
        let (kinds, issues) = FileAgentsConfig::default().parse_agents();
        assert_eq!(kinds, vec![AgentKind::Performance, AgentKind::Coaching]);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_unknown_name_excluded_with_issue() {
        let config = FileAgentsConfig {
            default: vec!["performance".to_string(), "wellness".to_string()],
            ..Default::default()
        };
        let (kinds, issues) = config.parse_agents();
        assert_eq!(kinds, vec![AgentKind::Performance]);
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_coordinator_excluded_from_defaults() {
        let config = FileAgentsConfig {
            default: vec!["coordinator".to_string()],
            ..Default::default()
        };
        let (kinds, issues) = config.parse_agents();
        assert!(kinds.is_empty());
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_bad_mode_falls_back() {
        let config = FileAgentsConfig {
            mode: "roundrobin".to_string(),
            ..Default::default()
        };
        let (mode, issues) = config.parse_mode();
        assert_eq!(mode, DispatchMode::Broadcast);
        assert_eq!(issues.len(), 1);
    }
}
