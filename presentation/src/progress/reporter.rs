//! Progress reporting for turn dispatch

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use relay_application::ports::progress::TurnProgressNotifier;
use relay_domain::{AgentKind, DispatchMode};
use std::sync::Mutex;

/// Reports dispatch progress with a progress bar
pub struct DispatchProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl DispatchProgress {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=>-")
    }

    fn mode_prefix(mode: &DispatchMode) -> &'static str {
        match mode {
            DispatchMode::Broadcast => "Broadcasting",
            DispatchMode::Coordinate => "Coordinating",
        }
    }
}

impl Default for DispatchProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnProgressNotifier for DispatchProgress {
    fn on_dispatch_start(&self, mode: &DispatchMode, total: usize) {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(Self::bar_style());
        pb.set_prefix(Self::mode_prefix(mode));
        pb.set_message("Waiting for agents...");
        *self.bar.lock().unwrap() = Some(pb);
    }

    fn on_agent_settled(&self, agent: &AgentKind, success: bool) {
        if let Some(pb) = self.bar.lock().unwrap().as_ref() {
            let status = if success {
                format!("{} {}", "v".green(), agent)
            } else {
                format!("{} {}", "x".red(), agent)
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_dispatch_complete(&self) {
        if let Some(pb) = self.bar.lock().unwrap().take() {
            pb.finish_with_message(format!("{}", "done".green()));
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl TurnProgressNotifier for SimpleProgress {
    fn on_dispatch_start(&self, mode: &DispatchMode, total: usize) {
        println!(
            "{} {} across {} agent(s)",
            "->".cyan(),
            DispatchProgress::mode_prefix(mode).bold(),
            total
        );
    }

    fn on_agent_settled(&self, agent: &AgentKind, success: bool) {
        if success {
            println!("  {} {}", "v".green(), agent);
        } else {
            println!("  {} {} (failed)", "x".red(), agent);
        }
    }

    fn on_dispatch_complete(&self) {
        println!();
    }
}
