//! Backend connection section of the config file

use relay_domain::ConfigIssue;
use serde::{Deserialize, Serialize};

/// `[backend]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBackendConfig {
    /// Base URL of the agent-execution backend
    pub base_url: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for FileBackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api/agents".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl FileBackendConfig {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.base_url.trim().is_empty() {
            issues.push(ConfigIssue::error("backend.base_url", "must not be empty"));
        }
        if self.request_timeout_secs == 0 {
            issues.push(ConfigIssue::warning(
                "backend.request_timeout_secs",
                "zero disables the timeout; the default of 30s is used instead",
            ));
        }
        issues
    }

    /// Effective timeout, substituting the default for a zero value.
    pub fn request_timeout(&self) -> std::time::Duration {
        let secs = if self.request_timeout_secs == 0 {
            Self::default().request_timeout_secs
        } else {
            self.request_timeout_secs
        };
        std::time::Duration::from_secs(secs)
    }
}
