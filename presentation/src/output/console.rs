//! Console output formatter for turns, tasks, and approvals

use crate::cli::commands::OutputFormat;
use colored::Colorize;
use relay_domain::{
    ActiveAgentSummary, AgentTask, AgentTaskAction, ConversationTurn, ResponseStatus,
};

/// Formats orchestration state for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    // ==================== Turns ====================

    /// Format a settled turn in the requested format.
    pub fn format_turn(turn: &ConversationTurn, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => Self::format_turn_full(turn),
            OutputFormat::Summary => Self::format_turn_summary(turn),
            OutputFormat::Json => Self::format_turn_json(turn),
        }
    }

    fn format_turn_full(turn: &ConversationTurn) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{} {}\n\n",
            "Message:".cyan().bold(),
            turn.user_message
        ));

        for response in &turn.responses {
            let header = format!("── {} ──", response.agent);
            match response.status {
                ResponseStatus::Success => {
                    output.push_str(&format!(
                        "{}\n{}\n",
                        header.yellow().bold(),
                        response.content
                    ));
                    if let Some(meta) = &response.metadata {
                        let mut parts = Vec::new();
                        if let Some(model) = &meta.model {
                            parts.push(model.clone());
                        }
                        if let Some(latency) = meta.latency_ms {
                            parts.push(format!("{latency}ms"));
                        }
                        if let Some(cost) = meta.cost_cents {
                            parts.push(format!("{cost:.2}c"));
                        }
                        if !parts.is_empty() {
                            output.push_str(&format!("{}\n", parts.join(" | ").dimmed()));
                        }
                    }
                    output.push('\n');
                }
                ResponseStatus::Error => {
                    output.push_str(&format!(
                        "{}\n{} {}\n\n",
                        header.yellow().bold(),
                        "x".red(),
                        response.error.as_deref().unwrap_or("unknown error")
                    ));
                }
                ResponseStatus::Loading => {
                    output.push_str(&format!("{}\n{}\n\n", header.yellow().bold(), "...".dimmed()));
                }
            }
        }
        output
    }

    fn format_turn_summary(turn: &ConversationTurn) -> String {
        let mut output = String::new();
        for response in &turn.responses {
            let line = match response.status {
                ResponseStatus::Success => format!(
                    "{} {}: {}",
                    "v".green(),
                    response.agent,
                    Self::first_line(&response.content)
                ),
                ResponseStatus::Error => format!(
                    "{} {}: {}",
                    "x".red(),
                    response.agent,
                    response.error.as_deref().unwrap_or("unknown error")
                ),
                ResponseStatus::Loading => format!("  {}: ...", response.agent),
            };
            output.push_str(&line);
            output.push('\n');
        }
        output
    }

    fn format_turn_json(turn: &ConversationTurn) -> String {
        serde_json::to_string_pretty(turn).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }

    // ==================== Tasks ====================

    /// Format the task list, one line per task.
    pub fn format_task_list(tasks: &[AgentTask]) -> String {
        if tasks.is_empty() {
            return format!("{}\n", "No tracked tasks".dimmed());
        }
        let mut output = String::new();
        for task in tasks {
            output.push_str(&Self::task_line(task));
            output.push('\n');
        }
        output
    }

    fn task_line(task: &AgentTask) -> String {
        let status = Self::status_glyph(task);
        let progress = if task.total_steps > 0 {
            format!(" [{}/{}]", task.current_step, task.total_steps)
        } else {
            String::new()
        };
        let proactive = if task.is_proactive {
            " (proactive)".dimmed().to_string()
        } else {
            String::new()
        };
        format!(
            "{} {} {} {}{}{}",
            status,
            task.id.to_string().dimmed(),
            task.title.bold(),
            task.status,
            progress,
            proactive
        )
    }

    fn status_glyph(task: &AgentTask) -> String {
        match task.status {
            s if s.is_terminal() && task.error.is_some() => "x".red().to_string(),
            s if s.is_terminal() => "v".green().to_string(),
            relay_domain::TaskStatus::AwaitingApproval => "!".yellow().to_string(),
            _ => ">".cyan().to_string(),
        }
    }

    /// Format one task with its plan, actions, and any approval gates.
    pub fn format_task_detail(task: &AgentTask) -> String {
        let mut output = String::new();
        output.push_str(&format!("{} {}\n", "Task:".cyan().bold(), task.title));
        output.push_str(&format!("{} {}\n", "Goal:".cyan().bold(), task.goal));
        output.push_str(&format!(
            "{} {} ({})\n",
            "Status:".cyan().bold(),
            task.status,
            task.agent_kind
        ));
        if task.total_steps > 0 {
            output.push_str(&format!(
                "{} {}/{}\n",
                "Progress:".cyan().bold(),
                task.current_step,
                task.total_steps
            ));
        }
        if let Some(parent) = &task.parent_task_id {
            output.push_str(&format!("{} {}\n", "Parent:".cyan().bold(), parent));
        }
        if let Some(error) = &task.error {
            output.push_str(&format!("{} {}\n", "Error:".red().bold(), error));
        }
        if let Some(result) = &task.result {
            output.push_str(&format!("{} {}\n", "Result:".green().bold(), result));
        }

        if !task.plan.is_empty() {
            output.push_str(&format!("\n{}\n", "Plan:".cyan().bold()));
            for (i, step) in task.plan.iter().enumerate() {
                let marker = match task.actions.get(i) {
                    Some(action) => format!("{}", action.status),
                    None => "planned".to_string(),
                };
                output.push_str(&format!(
                    "  {}. {} {} — {}\n",
                    i + 1,
                    step.tool_name.bold(),
                    format!("[{marker}]").dimmed(),
                    Self::first_line(&step.reasoning)
                ));
            }
        }

        let awaiting: Vec<&AgentTaskAction> = task.awaiting_approval().collect();
        if !awaiting.is_empty() {
            output.push_str(&format!(
                "\n{}\n",
                "Awaiting your approval:".yellow().bold()
            ));
            for action in awaiting {
                output.push_str(&Self::approval_line(action));
                output.push('\n');
            }
        }
        output
    }

    // ==================== Approvals ====================

    /// Format the cross-task pending-approvals list.
    pub fn format_approvals(actions: &[AgentTaskAction]) -> String {
        if actions.is_empty() {
            return format!("{}\n", "Nothing awaiting approval".dimmed());
        }
        let mut output = String::new();
        for action in actions {
            output.push_str(&Self::approval_line(action));
            output.push('\n');
        }
        output
    }

    fn approval_line(action: &AgentTaskAction) -> String {
        let reasoning = action
            .reasoning
            .as_deref()
            .map(Self::first_line)
            .unwrap_or_default();
        format!(
            "{} {} {} ({}) task {}{}",
            "!".yellow(),
            action.id.to_string().dimmed(),
            action.tool_name.bold(),
            action.impact_level,
            action.task_id,
            if reasoning.is_empty() {
                String::new()
            } else {
                format!(" — {reasoning}")
            }
        )
    }

    // ==================== Activity ====================

    /// Format the live-activity feed.
    pub fn format_activity(activity: &[ActiveAgentSummary]) -> String {
        if activity.is_empty() {
            return format!("{}\n", "No agents currently active".dimmed());
        }
        let mut output = String::new();
        for entry in activity {
            let (current, total) = entry.progress();
            let progress = if total > 0 {
                format!(" [{current}/{total}]")
            } else {
                String::new()
            };
            let proactive = if entry.is_proactive {
                " (proactive)".dimmed().to_string()
            } else {
                String::new()
            };
            output.push_str(&format!(
                "{} {} {} {}{}{} since {}\n",
                ">".cyan(),
                entry.agent_kind,
                entry.title.bold(),
                entry.status,
                progress,
                proactive,
                entry.started_at.format("%H:%M:%S")
            ));
        }
        output
    }

    fn first_line(text: &str) -> String {
        text.lines().next().unwrap_or("").to_string()
    }
}
