//! Polling cadence section of the config file

use relay_application::SyncIntervals;
use relay_domain::ConfigIssue;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// `[sync]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSyncConfig {
    /// Task-list poll interval in seconds
    pub task_interval_secs: u64,
    /// Active-agents feed poll interval in seconds
    pub activity_interval_secs: u64,
}

impl Default for FileSyncConfig {
    fn default() -> Self {
        Self {
            task_interval_secs: 10,
            activity_interval_secs: 8,
        }
    }
}

impl FileSyncConfig {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.task_interval_secs == 0 {
            issues.push(ConfigIssue::warning(
                "sync.task_interval_secs",
                "zero interval would spin; the default of 10s is used instead",
            ));
        }
        if self.activity_interval_secs == 0 {
            issues.push(ConfigIssue::warning(
                "sync.activity_interval_secs",
                "zero interval would spin; the default of 8s is used instead",
            ));
        }
        issues
    }

    /// Effective intervals, substituting defaults for zero values.
    pub fn to_intervals(&self) -> SyncIntervals {
        let defaults = Self::default();
        let tasks = if self.task_interval_secs == 0 {
            defaults.task_interval_secs
        } else {
            self.task_interval_secs
        };
        let activity = if self.activity_interval_secs == 0 {
            defaults.activity_interval_secs
        } else {
            self.activity_interval_secs
        };
        SyncIntervals {
            tasks: Duration::from_secs(tasks),
            activity: Duration::from_secs(activity),
        }
    }
}
