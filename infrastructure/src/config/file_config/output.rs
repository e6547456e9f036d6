//! Output and event-log section of the config file

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[output]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Write the orchestration event transcript as JSONL
    pub event_log_enabled: bool,
    /// Event-log path; defaults under the user data dir when unset
    pub event_log_path: Option<PathBuf>,
}

impl FileOutputConfig {
    /// Resolve the event-log path, defaulting under the user data dir.
    pub fn resolved_event_log_path(&self) -> Option<PathBuf> {
        if !self.event_log_enabled {
            return None;
        }
        self.event_log_path.clone().or_else(|| {
            dirs::data_dir().map(|d| d.join("agent-relay").join("events.jsonl"))
        })
    }
}
