//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for turn results
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Full per-agent blocks with metadata
    Full,
    /// One line per agent
    Summary,
    /// JSON output
    Json,
}

/// CLI arguments for agent-relay
#[derive(Parser, Debug)]
#[command(name = "agent-relay")]
#[command(author, version, about = "Multi-agent orchestration client")]
#[command(long_about = r#"
agent-relay talks to the agent-execution backend of your performance
management workspace: broadcast a question to up to five specialist agents,
route it through the coordinating agent, and track long-running agent tasks
with their human-approval gates.

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./relay.toml        Project-level config
3. ~/.config/agent-relay/config.toml   Global config

Example:
  agent-relay ask "What is our attrition risk?" -a performance -a analytics
  agent-relay ask --coordinate "Draft Q3 goals" -a performance -a goals
  agent-relay tasks --watch
  agent-relay reject act-42 --reason "wrong goal target"
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long, global = true)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send a message to the selected agents
    Ask {
        /// The message to send
        message: String,

        /// Agents to target (can be specified multiple times; defaults
        /// from config)
        #[arg(short, long, value_name = "AGENT")]
        agent: Vec<String>,

        /// Route through the coordinating agent instead of broadcasting
        #[arg(long)]
        coordinate: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "full")]
        output: OutputFormat,
    },

    /// List tracked agent tasks
    Tasks {
        /// Keep polling and re-render on changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Show one task with its plan and actions
    Task {
        /// Task id
        id: String,
    },

    /// Cancel a running task
    Cancel {
        /// Task id
        id: String,
    },

    /// List actions awaiting human approval
    Approvals,

    /// Approve an action awaiting human approval
    Approve {
        /// Action id
        id: String,
    },

    /// Reject an action awaiting human approval
    Reject {
        /// Action id
        id: String,

        /// Why the action is rejected (required, non-empty)
        #[arg(short, long)]
        reason: String,
    },

    /// Show the live agent-activity feed
    Activity {
        /// Keep polling and re-render on changes
        #[arg(short, long)]
        watch: bool,
    },
}
