//! CLI entrypoint for agent-relay
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use relay_application::{
    ApprovalGate, ApprovalOutcome, CancelOutcome, EventLogger, NoEventLogger, SubmitTurnInput,
    SubmitTurnUseCase, TaskLifecycleSync, TaskMirror, TurnFeed,
};
use relay_domain::{AgentKind, AgentTaskAction, DispatchMode, TaskId};
use relay_infrastructure::{
    BackendSettings, ConfigLoader, FileConfig, HttpAgentBackend, JsonlEventLogger,
};
use relay_presentation::{Cli, Command, ConsoleFormatter, DispatchProgress, OutputFormat};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

type TaskSync = TaskLifecycleSync<HttpAgentBackend>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    // Load configuration
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow::anyhow!("failed to load configuration: {e}"))?
    };
    for issue in config.validate() {
        warn!("{issue}");
    }

    info!("Starting agent-relay");

    // === Dependency Injection ===
    let backend = Arc::new(
        HttpAgentBackend::new(&BackendSettings {
            base_url: config.backend.base_url.clone(),
            request_timeout: config.backend.request_timeout(),
        })
        .context("failed to build backend client")?,
    );

    let logger: Arc<dyn EventLogger> = match config.output.resolved_event_log_path() {
        Some(path) => match JsonlEventLogger::new(&path) {
            Some(jsonl) => {
                info!("Writing orchestration events to {}", jsonl.path().display());
                Arc::new(jsonl)
            }
            None => Arc::new(NoEventLogger),
        },
        None => Arc::new(NoEventLogger),
    };

    match cli.command {
        Command::Ask {
            ref message,
            ref agent,
            coordinate,
            output,
        } => {
            run_ask(
                &cli, &config, backend, logger, message, agent, coordinate, output,
            )
            .await
        }
        Command::Tasks { watch } => {
            let sync = make_sync(backend, &config, logger);
            if watch {
                watch_mirror(sync, |mirror| {
                    ConsoleFormatter::format_task_list(&mirror.tasks())
                })
                .await
            } else {
                sync.refresh_once().await.context("task poll failed")?;
                print!("{}", ConsoleFormatter::format_task_list(&sync.mirror().tasks()));
                Ok(())
            }
        }
        Command::Task { ref id } => {
            let sync = make_sync(backend, &config, logger);
            let id = TaskId::new(id.as_str());
            sync.mirror().select(Some(id.clone()));
            sync.refresh_once().await.context("task poll failed")?;
            match sync.mirror().selected_task() {
                Some(task) => {
                    print!("{}", ConsoleFormatter::format_task_detail(&task));
                    Ok(())
                }
                None => bail!("task {id} not found"),
            }
        }
        Command::Cancel { ref id } => {
            let sync = make_sync(backend, &config, logger);
            sync.refresh_once().await.context("task poll failed")?;
            let id = TaskId::new(id.as_str());
            match sync.cancel(&id).await.context("cancel failed")? {
                CancelOutcome::Requested => {
                    println!("Cancel requested for task {id}");
                    Ok(())
                }
                CancelOutcome::NoEffect => {
                    println!("Task {id} is not cancellable; nothing sent");
                    Ok(())
                }
            }
        }
        Command::Approvals => {
            let sync = make_sync(backend, &config, logger);
            sync.refresh_once().await.context("task poll failed")?;
            let awaiting = awaiting_actions(sync.mirror());
            print!("{}", ConsoleFormatter::format_approvals(&awaiting));
            Ok(())
        }
        Command::Approve { ref id } => {
            let sync = make_sync(Arc::clone(&backend), &config, Arc::clone(&logger));
            sync.refresh_once().await.context("task poll failed")?;
            let gate =
                ApprovalGate::new(backend, Arc::clone(sync.mirror())).with_logger(logger);
            match gate.approve(&id.as_str().into()).await? {
                ApprovalOutcome::Submitted => println!("Approved action {id}"),
                ApprovalOutcome::NoEffect => {
                    println!("Action {id} is not awaiting approval; nothing sent")
                }
            }
            Ok(())
        }
        Command::Reject { ref id, ref reason } => {
            let sync = make_sync(Arc::clone(&backend), &config, Arc::clone(&logger));
            sync.refresh_once().await.context("task poll failed")?;
            let gate =
                ApprovalGate::new(backend, Arc::clone(sync.mirror())).with_logger(logger);
            match gate.reject(&id.as_str().into(), reason).await? {
                ApprovalOutcome::Submitted => println!("Rejected action {id}"),
                ApprovalOutcome::NoEffect => {
                    println!("Action {id} is not awaiting approval; nothing sent")
                }
            }
            Ok(())
        }
        Command::Activity { watch } => {
            let sync = make_sync(backend, &config, logger);
            if watch {
                watch_mirror(sync, |mirror| {
                    ConsoleFormatter::format_activity(&mirror.activity())
                })
                .await
            } else {
                sync.poll_activity_once().await.context("activity poll failed")?;
                print!("{}", ConsoleFormatter::format_activity(&sync.mirror().activity()));
                Ok(())
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_ask(
    cli: &Cli,
    config: &FileConfig,
    backend: Arc<HttpAgentBackend>,
    logger: Arc<dyn EventLogger>,
    message: &str,
    agent_flags: &[String],
    coordinate: bool,
    output: OutputFormat,
) -> Result<()> {
    // Agent flags win; otherwise the configured default selection
    let agents: Vec<AgentKind> = if agent_flags.is_empty() {
        config.agents.parse_agents().0
    } else {
        agent_flags.iter().map(|s| s.parse().unwrap()).collect()
    };
    let mode = if coordinate {
        DispatchMode::Coordinate
    } else {
        config.agents.parse_mode().0
    };

    let feed = Arc::new(TurnFeed::new());
    let use_case = SubmitTurnUseCase::new(backend, feed).with_logger(logger);
    let input = SubmitTurnInput::new(message, agents).with_mode(mode);

    let turn = if cli.quiet {
        use_case.execute(input).await?
    } else {
        let progress = DispatchProgress::new();
        use_case.execute_with_progress(input, &progress).await?
    };

    print!("{}", ConsoleFormatter::format_turn(&turn, output));
    Ok(())
}

fn make_sync(
    backend: Arc<HttpAgentBackend>,
    config: &FileConfig,
    logger: Arc<dyn EventLogger>,
) -> Arc<TaskSync> {
    Arc::new(
        TaskLifecycleSync::new(backend, Arc::new(TaskMirror::new()))
            .with_intervals(config.sync.to_intervals())
            .with_logger(logger),
    )
}

fn awaiting_actions(mirror: &TaskMirror) -> Vec<AgentTaskAction> {
    mirror
        .tasks()
        .iter()
        .flat_map(|t| t.awaiting_approval().cloned().collect::<Vec<_>>())
        .collect()
}

/// Run the sync loops in the background, re-rendering on every mirror
/// change until Ctrl-C.
async fn watch_mirror(
    sync: Arc<TaskSync>,
    render: impl Fn(&TaskMirror) -> String,
) -> Result<()> {
    let token = CancellationToken::new();
    let runner = {
        let sync = Arc::clone(&sync);
        let token = token.clone();
        tokio::spawn(async move { sync.run(token).await })
    };

    let mut rx = sync.mirror().subscribe();
    println!("Watching (Ctrl-C to stop)...");
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                token.cancel();
                break;
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                print!("{}", render(sync.mirror()));
            }
        }
    }

    runner.await.context("sync task failed")?;
    Ok(())
}
