//! Broadcast fan-out: one concurrent gateway call per selected agent.

use crate::ports::agent_gateway::AgentGateway;
use crate::ports::event_logger::{EventLogger, OrchestrationEvent};
use crate::ports::progress::TurnProgressNotifier;
use crate::use_cases::submit_turn::SubmitTurnError;
use crate::use_cases::turn_feed::TurnFeed;
use relay_domain::{
    AgentKind, AgentResponse, AgentSelection, ConversationTurn, DispatchMode, ResponseStatus,
    UserMessage,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

pub(super) async fn run<G: AgentGateway + 'static>(
    gateway: Arc<G>,
    feed: &TurnFeed,
    logger: &dyn EventLogger,
    progress: &dyn TurnProgressNotifier,
    message: &UserMessage,
    selection: &AgentSelection,
) -> Result<ConversationTurn, SubmitTurnError> {
    let turn_id = feed
        .begin_broadcast(message.content(), selection.agents())
        .map_err(|_| SubmitTurnError::TurnInFlight)?;

    info!(
        "Broadcasting turn {} to {} agents",
        turn_id,
        selection.len()
    );
    logger.log(OrchestrationEvent::new(
        "turn_submitted",
        serde_json::json!({
            "turn_id": turn_id.as_str(),
            "mode": "broadcast",
            "agents": selection.agents(),
        }),
    ));
    progress.on_dispatch_start(&DispatchMode::Broadcast, selection.len());

    let mut join_set = tokio::task::JoinSet::new();
    for agent in selection.agents() {
        let gateway = Arc::clone(&gateway);
        let agent = agent.clone();
        let message = message.content().to_string();

        join_set.spawn(async move {
            let started = Instant::now();
            let result = gateway.chat(&message, &agent, None).await;
            (agent, started.elapsed(), result)
        });
    }

    // Agents whose slot has not settled yet; a join failure (task panic)
    // must still terminate its slot or the turn could never finish.
    let mut unsettled: Vec<AgentKind> = selection.agents().to_vec();

    while let Some(joined) = join_set.join_next().await {
        let response = match joined {
            Ok((agent, elapsed, Ok(reply))) => {
                info!("Agent {} responded for turn {}", agent, turn_id);
                progress.on_agent_settled(&agent, true);
                let metadata = reply
                    .metadata
                    .unwrap_or_default()
                    .with_measured_latency(elapsed.as_millis() as u64);
                AgentResponse::success(agent, reply.content).with_metadata(metadata)
            }
            Ok((agent, _, Err(e))) => {
                warn!("Agent {} failed for turn {}: {}", agent, turn_id, e);
                progress.on_agent_settled(&agent, false);
                AgentResponse::failure(agent, e.to_string())
            }
            Err(e) => {
                warn!("Agent task join error: {}", e);
                continue;
            }
        };
        unsettled.retain(|a| a != &response.agent);
        logger.log(OrchestrationEvent::new(
            "agent_response",
            serde_json::json!({
                "turn_id": turn_id.as_str(),
                "agent": response.agent,
                "success": response.is_success(),
            }),
        ));
        feed.record(&turn_id, response);
    }

    for agent in unsettled {
        warn!("Agent {} never settled for turn {}", agent, turn_id);
        progress.on_agent_settled(&agent, false);
        feed.record(
            &turn_id,
            AgentResponse::failure(agent, "agent task aborted before completion"),
        );
    }

    let turn = feed.finish(&turn_id).ok_or_else(|| {
        SubmitTurnError::Internal(format!("turn {turn_id} could not be finished"))
    })?;
    progress.on_dispatch_complete();
    logger.log(OrchestrationEvent::new(
        "turn_completed",
        serde_json::json!({
            "turn_id": turn_id.as_str(),
            "success_count": turn.count_with_status(ResponseStatus::Success),
            "error_count": turn.count_with_status(ResponseStatus::Error),
        }),
    ));
    Ok(turn)
}
