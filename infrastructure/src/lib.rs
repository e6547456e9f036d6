//! Infrastructure layer for agent-relay
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod backend;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use backend::{BackendSettings, HttpAgentBackend};
pub use config::{
    ConfigLoader, FileAgentsConfig, FileBackendConfig, FileConfig, FileOutputConfig,
    FileSyncConfig,
};
pub use logging::JsonlEventLogger;
