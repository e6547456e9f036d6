//! Submit-turn use case
//!
//! Routes one user message through exactly one dispatch mode:
//! - **Broadcast** fans the message out to every selected agent
//!   concurrently and settles each response slot independently
//!   ([`broadcast`]).
//! - **Coordinate** sends a single request naming the agent set to the
//!   coordinating endpoint and fills a single consolidated slot
//!   ([`coordinate`]).
//!
//! All preconditions are checked before any network call and surface as a
//! synchronous refusal; transport failures are absorbed into response
//! slots and never thrown to the caller.

mod broadcast;
mod coordinate;

use crate::ports::agent_gateway::AgentGateway;
use crate::ports::event_logger::{EventLogger, NoEventLogger};
use crate::ports::progress::{NoTurnProgress, TurnProgressNotifier};
use crate::use_cases::turn_feed::TurnFeed;
use relay_domain::{
    AgentKind, AgentSelection, ConversationTurn, DispatchMode, SelectionError, UserMessage,
};
use std::sync::Arc;
use thiserror::Error;

/// Precondition violations, reported synchronously to the caller.
/// No variant here ever corresponds to a network call having been made.
#[derive(Error, Debug)]
pub enum SubmitTurnError {
    #[error("Message cannot be empty")]
    EmptyMessage,

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error("Coordinate mode requires at least two agents")]
    CoordinateRequiresPeers,

    #[error("A turn is already in flight")]
    TurnInFlight,

    #[error("Turn state inconsistency: {0}")]
    Internal(String),
}

/// Input for the submit-turn use case
#[derive(Debug, Clone)]
pub struct SubmitTurnInput {
    pub message: String,
    pub agents: Vec<AgentKind>,
    pub mode: DispatchMode,
}

impl SubmitTurnInput {
    pub fn new(message: impl Into<String>, agents: Vec<AgentKind>) -> Self {
        Self {
            message: message.into(),
            agents,
            mode: DispatchMode::Broadcast,
        }
    }

    pub fn with_mode(mut self, mode: DispatchMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Use case for dispatching one user message across the selected agents
pub struct SubmitTurnUseCase<G: AgentGateway + 'static> {
    gateway: Arc<G>,
    feed: Arc<TurnFeed>,
    logger: Arc<dyn EventLogger>,
}

impl<G: AgentGateway + 'static> SubmitTurnUseCase<G> {
    pub fn new(gateway: Arc<G>, feed: Arc<TurnFeed>) -> Self {
        Self {
            gateway,
            feed,
            logger: Arc::new(NoEventLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn EventLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// The feed this use case publishes turns into.
    pub fn feed(&self) -> &Arc<TurnFeed> {
        &self.feed
    }

    /// Execute with default (no-op) progress
    pub async fn execute(
        &self,
        input: SubmitTurnInput,
    ) -> Result<ConversationTurn, SubmitTurnError> {
        self.execute_with_progress(input, &NoTurnProgress).await
    }

    /// Execute with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: SubmitTurnInput,
        progress: &dyn TurnProgressNotifier,
    ) -> Result<ConversationTurn, SubmitTurnError> {
        let message =
            UserMessage::try_new(input.message).ok_or(SubmitTurnError::EmptyMessage)?;
        let selection = AgentSelection::new(input.agents)?;

        match input.mode {
            DispatchMode::Broadcast => {
                broadcast::run(
                    Arc::clone(&self.gateway),
                    &self.feed,
                    self.logger.as_ref(),
                    progress,
                    &message,
                    &selection,
                )
                .await
            }
            DispatchMode::Coordinate => {
                if selection.len() < 2 {
                    return Err(SubmitTurnError::CoordinateRequiresPeers);
                }
                coordinate::run(
                    self.gateway.as_ref(),
                    &self.feed,
                    self.logger.as_ref(),
                    progress,
                    &message,
                    &selection,
                )
                .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::agent_gateway::{ChatReply, GatewayError};
    use async_trait::async_trait;
    use relay_domain::ResponseStatus;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// What a scripted agent should do when called
    enum Script {
        Reply(String),
        Fail(String),
        /// Wait for the notify before replying
        BlockThenReply(Arc<Notify>, String),
    }

    struct ScriptedGateway {
        scripts: Mutex<HashMap<AgentKind, Script>>,
        chat_calls: AtomicUsize,
        coordinate_calls: AtomicUsize,
        coordinate_script: Mutex<Option<Script>>,
    }

    impl ScriptedGateway {
        fn new() -> Self {
            Self {
                scripts: Mutex::new(HashMap::new()),
                chat_calls: AtomicUsize::new(0),
                coordinate_calls: AtomicUsize::new(0),
                coordinate_script: Mutex::new(None),
            }
        }

        fn script(self, agent: AgentKind, script: Script) -> Self {
            self.scripts.lock().unwrap().insert(agent, script);
            self
        }

        fn script_coordinate(self, script: Script) -> Self {
            *self.coordinate_script.lock().unwrap() = Some(script);
            self
        }

        async fn play(script: Script) -> Result<ChatReply, GatewayError> {
            match script {
                Script::Reply(content) => Ok(ChatReply::new(content)),
                Script::Fail(message) => Err(GatewayError::Connection(message)),
                Script::BlockThenReply(notify, content) => {
                    notify.notified().await;
                    Ok(ChatReply::new(content))
                }
            }
        }
    }

    #[async_trait]
    impl AgentGateway for ScriptedGateway {
        async fn chat(
            &self,
            _message: &str,
            agent: &AgentKind,
            _conversation_id: Option<&str>,
        ) -> Result<ChatReply, GatewayError> {
            self.chat_calls.fetch_add(1, Ordering::SeqCst);
            let script = self
                .scripts
                .lock()
                .unwrap()
                .remove(agent)
                .unwrap_or(Script::Fail(format!("no script for {agent}")));
            Self::play(script).await
        }

        async fn coordinate_chat(
            &self,
            _message: &str,
            _agents: &[AgentKind],
        ) -> Result<ChatReply, GatewayError> {
            self.coordinate_calls.fetch_add(1, Ordering::SeqCst);
            let script = self
                .coordinate_script
                .lock()
                .unwrap()
                .take()
                .unwrap_or(Script::Fail("no coordinate script".to_string()));
            Self::play(script).await
        }
    }

    fn use_case(gateway: ScriptedGateway) -> SubmitTurnUseCase<ScriptedGateway> {
        SubmitTurnUseCase::new(Arc::new(gateway), Arc::new(TurnFeed::new()))
    }

    #[tokio::test]
    async fn test_broadcast_three_agents_one_fails() {
        let gateway = ScriptedGateway::new()
            .script(AgentKind::Performance, Script::Reply("attrition is low".into()))
            .script(AgentKind::Coaching, Script::Reply("coach more".into()))
            .script(AgentKind::Goals, Script::Fail("network error".into()));
        let uc = use_case(gateway);

        let turn = uc
            .execute(SubmitTurnInput::new(
                "What is attrition risk?",
                vec![AgentKind::Performance, AgentKind::Coaching, AgentKind::Goals],
            ))
            .await
            .unwrap();

        assert_eq!(turn.count_with_status(ResponseStatus::Success), 2);
        assert_eq!(turn.count_with_status(ResponseStatus::Error), 1);
        let failed = turn.response_for(&AgentKind::Goals).unwrap();
        assert_eq!(failed.status, ResponseStatus::Error);
        assert!(failed.error.as_deref().unwrap().contains("network error"));
        // Sibling success content intact despite the failure
        assert_eq!(
            turn.response_for(&AgentKind::Performance).unwrap().content,
            "attrition is low"
        );
        // The turn is in history, not active
        assert!(uc.feed().active().is_none());
        assert_eq!(uc.feed().history().len(), 1);
    }

    #[tokio::test]
    async fn test_all_agents_failing_still_completes_turn() {
        let gateway = ScriptedGateway::new()
            .script(AgentKind::Performance, Script::Fail("boom".into()))
            .script(AgentKind::Coaching, Script::Fail("boom".into()));
        let uc = use_case(gateway);

        let turn = uc
            .execute(SubmitTurnInput::new(
                "q",
                vec![AgentKind::Performance, AgentKind::Coaching],
            ))
            .await
            .unwrap();

        assert!(turn.is_settled());
        assert_eq!(turn.count_with_status(ResponseStatus::Error), 2);
        assert_eq!(uc.feed().history().len(), 1);
    }

    #[tokio::test]
    async fn test_second_submit_rejected_while_turn_active() {
        let release = Arc::new(Notify::new());
        let gateway = ScriptedGateway::new().script(
            AgentKind::Performance,
            Script::BlockThenReply(Arc::clone(&release), "slow answer".into()),
        );
        let uc = Arc::new(use_case(gateway));

        let first = {
            let uc = Arc::clone(&uc);
            tokio::spawn(async move {
                uc.execute(SubmitTurnInput::new("q1", vec![AgentKind::Performance]))
                    .await
            })
        };

        // Wait until the first turn has claimed the active slot
        let mut rx = uc.feed().subscribe();
        while rx.borrow().active.is_none() {
            rx.changed().await.unwrap();
        }

        let second = uc
            .execute(SubmitTurnInput::new("q2", vec![AgentKind::Coaching]))
            .await;
        assert!(matches!(second, Err(SubmitTurnError::TurnInFlight)));
        // The active turn is unaffected by the refusal
        assert_eq!(uc.feed().active().unwrap().user_message, "q1");

        release.notify_one();
        let turn = first.await.unwrap().unwrap();
        assert!(turn.is_settled());
        assert_eq!(uc.feed().history().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_message_refused_without_network() {
        let gateway = ScriptedGateway::new();
        let uc = use_case(gateway);
        let err = uc
            .execute(SubmitTurnInput::new("   ", vec![AgentKind::Performance]))
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitTurnError::EmptyMessage));
        assert!(uc.feed().active().is_none());
        assert!(uc.feed().history().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_agent_refused() {
        let uc = use_case(ScriptedGateway::new());
        let err = uc
            .execute(SubmitTurnInput::new(
                "q",
                vec![AgentKind::Unknown("wellness".to_string())],
            ))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SubmitTurnError::Selection(SelectionError::UnknownAgent(_))
        ));
    }

    #[tokio::test]
    async fn test_coordinate_produces_single_coordinator_response() {
        let gateway = ScriptedGateway::new()
            .script_coordinate(Script::Reply("merged Q3 goals".into()));
        let uc = use_case(gateway);

        let turn = uc
            .execute(
                SubmitTurnInput::new(
                    "Draft Q3 goals",
                    vec![AgentKind::Performance, AgentKind::Goals],
                )
                .with_mode(DispatchMode::Coordinate),
            )
            .await
            .unwrap();

        assert_eq!(turn.responses.len(), 1);
        assert_eq!(turn.responses[0].agent, AgentKind::Coordinator);
        assert!(turn.responses[0].is_success());
        assert_eq!(uc.feed().history().len(), 1);
    }

    #[tokio::test]
    async fn test_coordinate_error_fills_single_slot() {
        let gateway =
            ScriptedGateway::new().script_coordinate(Script::Fail("backend down".into()));
        let uc = use_case(gateway);

        let turn = uc
            .execute(
                SubmitTurnInput::new("q", vec![AgentKind::Performance, AgentKind::Goals])
                    .with_mode(DispatchMode::Coordinate),
            )
            .await
            .unwrap();

        assert_eq!(turn.responses.len(), 1);
        assert_eq!(turn.responses[0].status, ResponseStatus::Error);
    }

    #[tokio::test]
    async fn test_coordinate_requires_two_agents() {
        let uc = use_case(ScriptedGateway::new());
        let err = uc
            .execute(
                SubmitTurnInput::new("q", vec![AgentKind::Performance])
                    .with_mode(DispatchMode::Coordinate),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitTurnError::CoordinateRequiresPeers));
    }

    #[tokio::test]
    async fn test_mode_routing_is_exclusive() {
        // Broadcast never touches the coordinate endpoint and vice versa
        let gateway = ScriptedGateway::new()
            .script(AgentKind::Performance, Script::Reply("a".into()))
            .script(AgentKind::Coaching, Script::Reply("b".into()));
        let uc = use_case(gateway);
        uc.execute(SubmitTurnInput::new(
            "q",
            vec![AgentKind::Performance, AgentKind::Coaching],
        ))
        .await
        .unwrap();
        assert_eq!(uc.gateway.coordinate_calls.load(Ordering::SeqCst), 0);
        assert_eq!(uc.gateway.chat_calls.load(Ordering::SeqCst), 2);

        let gateway = ScriptedGateway::new().script_coordinate(Script::Reply("c".into()));
        let uc = use_case(gateway);
        uc.execute(
            SubmitTurnInput::new("q", vec![AgentKind::Performance, AgentKind::Coaching])
                .with_mode(DispatchMode::Coordinate),
        )
        .await
        .unwrap();
        assert_eq!(uc.gateway.chat_calls.load(Ordering::SeqCst), 0);
        assert_eq!(uc.gateway.coordinate_calls.load(Ordering::SeqCst), 1);
    }
}
