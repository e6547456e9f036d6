//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and validated afterwards; a bad value is
//! reported as a [`ConfigIssue`] and excluded or defaulted, never fatal.

mod agents;
mod backend;
mod output;
mod sync;

pub use agents::FileAgentsConfig;
pub use backend::FileBackendConfig;
pub use output::FileOutputConfig;
pub use sync::FileSyncConfig;

use relay_domain::ConfigIssue;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Backend connection settings
    pub backend: FileBackendConfig,
    /// Polling cadences
    pub sync: FileSyncConfig,
    /// Default agent selection and mode
    pub agents: FileAgentsConfig,
    /// Output and event-log settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Checks agent names against the known set (unknown names are
    /// excluded, fail closed), the dispatch-mode string, and the polling
    /// intervals.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        issues.extend(self.agents.validate());
        issues.extend(self.sync.validate());
        issues.extend(self.backend.validate());
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = FileConfig::default();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_toml_roundtrip() {
        let toml_src = r#"
            [backend]
            base_url = "http://backend:4000/api/agents"
            request_timeout_secs = 15

            [sync]
            task_interval_secs = 5
            activity_interval_secs = 4

            [agents]
            default = ["performance", "coaching"]
            mode = "coordinate"
        "#;
        let config: FileConfig = toml::from_str(toml_src).unwrap();
        assert_eq!(config.backend.base_url, "http://backend:4000/api/agents");
        assert_eq!(config.backend.request_timeout_secs, 15);
        assert_eq!(config.sync.task_interval_secs, 5);
        assert_eq!(config.agents.default, vec!["performance", "coaching"]);
        assert_eq!(config.agents.mode, "coordinate");
        assert!(config.validate().is_empty());
    }
}
