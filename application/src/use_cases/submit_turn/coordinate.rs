//! Coordinate mode: one request naming the full agent set, one
//! consolidated response slot tagged with the coordinator kind.

use crate::ports::agent_gateway::AgentGateway;
use crate::ports::event_logger::{EventLogger, OrchestrationEvent};
use crate::ports::progress::TurnProgressNotifier;
use crate::use_cases::submit_turn::SubmitTurnError;
use crate::use_cases::turn_feed::TurnFeed;
use relay_domain::{
    AgentKind, AgentResponse, AgentSelection, ConversationTurn, DispatchMode, UserMessage,
};
use std::time::Instant;
use tracing::{info, warn};

pub(super) async fn run<G: AgentGateway>(
    gateway: &G,
    feed: &TurnFeed,
    logger: &dyn EventLogger,
    progress: &dyn TurnProgressNotifier,
    message: &UserMessage,
    selection: &AgentSelection,
) -> Result<ConversationTurn, SubmitTurnError> {
    let turn_id = feed
        .begin_coordinate(message.content())
        .map_err(|_| SubmitTurnError::TurnInFlight)?;

    info!(
        "Coordinating turn {} across {} agents",
        turn_id,
        selection.len()
    );
    // The full requested set goes to the transcript even though the turn
    // has a single coordinator slot.
    logger.log(OrchestrationEvent::new(
        "turn_submitted",
        serde_json::json!({
            "turn_id": turn_id.as_str(),
            "mode": "coordinate",
            "agents": selection.agents(),
        }),
    ));
    progress.on_dispatch_start(&DispatchMode::Coordinate, 1);

    let started = Instant::now();
    let response = match gateway
        .coordinate_chat(message.content(), selection.agents())
        .await
    {
        Ok(reply) => {
            info!("Coordinator responded for turn {}", turn_id);
            progress.on_agent_settled(&AgentKind::Coordinator, true);
            let metadata = reply
                .metadata
                .unwrap_or_default()
                .with_measured_latency(started.elapsed().as_millis() as u64);
            AgentResponse::success(AgentKind::Coordinator, reply.content).with_metadata(metadata)
        }
        Err(e) => {
            warn!("Coordinator failed for turn {}: {}", turn_id, e);
            progress.on_agent_settled(&AgentKind::Coordinator, false);
            AgentResponse::failure(AgentKind::Coordinator, e.to_string())
        }
    };

    logger.log(OrchestrationEvent::new(
        "agent_response",
        serde_json::json!({
            "turn_id": turn_id.as_str(),
            "agent": AgentKind::Coordinator,
            "success": response.is_success(),
        }),
    ));
    feed.record(&turn_id, response);

    let turn = feed.finish(&turn_id).ok_or_else(|| {
        SubmitTurnError::Internal(format!("turn {turn_id} could not be finished"))
    })?;
    progress.on_dispatch_complete();
    logger.log(OrchestrationEvent::new(
        "turn_completed",
        serde_json::json!({
            "turn_id": turn_id.as_str(),
            "success": turn.responses[0].is_success(),
        }),
    ));
    Ok(turn)
}
