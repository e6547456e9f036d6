//! Reqwest-based backend adapter implementing both application ports.

use super::protocol::{
    ActionDto, ActiveAgentDto, ChatRequest, ChatResponseDto, CoordinateChatRequest, RejectRequest,
    TaskDto, actions_into_domain, activity_into_domain, tasks_into_domain,
};
use async_trait::async_trait;
use relay_application::{AgentGateway, ChatReply, GatewayError, TaskBackend, TaskBackendError};
use relay_domain::{ActionId, ActiveAgentSummary, AgentKind, AgentTask, AgentTaskAction, TaskId};
use std::time::Duration;
use tracing::debug;

/// Connection settings for the agent-execution backend
#[derive(Debug, Clone)]
pub struct BackendSettings {
    /// Base URL, e.g. `http://localhost:3000/api/agents`
    pub base_url: String,
    /// Per-request timeout; a timed-out call fails like any other
    pub request_timeout: Duration,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api/agents".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP adapter for the remote agent-execution backend
pub struct HttpAgentBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAgentBackend {
    pub fn new(settings: &BackendSettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Read a non-2xx response into a status + best-effort body message.
    async fn error_parts(response: reqwest::Response) -> (u16, String) {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        let message = message.trim().chars().take(500).collect();
        (status, message)
    }

    fn gateway_error(e: reqwest::Error) -> GatewayError {
        if e.is_timeout() {
            GatewayError::Timeout
        } else if e.is_connect() {
            GatewayError::Connection(e.to_string())
        } else {
            GatewayError::Other(e.to_string())
        }
    }

    fn backend_error(e: reqwest::Error) -> TaskBackendError {
        if e.is_timeout() {
            TaskBackendError::Timeout
        } else if e.is_connect() {
            TaskBackendError::Connection(e.to_string())
        } else {
            TaskBackendError::Other(e.to_string())
        }
    }

    /// GET a JSON payload, mapping transport and status failures.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, TaskBackendError> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(Self::backend_error)?;
        if response.status().as_u16() == 404 {
            return Err(TaskBackendError::NotFound(path.to_string()));
        }
        if !response.status().is_success() {
            let (status, message) = Self::error_parts(response).await;
            return Err(TaskBackendError::Http { status, message });
        }
        response
            .json()
            .await
            .map_err(|e| TaskBackendError::InvalidResponse(e.to_string()))
    }

    /// POST a command with no meaningful response body.
    async fn post_command<B: serde::Serialize>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), TaskBackendError> {
        let mut request = self.client.post(self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(Self::backend_error)?;
        if response.status().as_u16() == 404 {
            return Err(TaskBackendError::NotFound(path.to_string()));
        }
        if !response.status().is_success() {
            let (status, message) = Self::error_parts(response).await;
            return Err(TaskBackendError::Http { status, message });
        }
        Ok(())
    }
}

#[async_trait]
impl AgentGateway for HttpAgentBackend {
    async fn chat(
        &self,
        message: &str,
        agent: &AgentKind,
        conversation_id: Option<&str>,
    ) -> Result<ChatReply, GatewayError> {
        debug!("POST chat for agent {}", agent);
        let request = ChatRequest {
            message,
            agent_type: Some(agent.as_str()),
            conversation_id,
        };
        let response = self
            .client
            .post(self.url("chat"))
            .json(&request)
            .send()
            .await
            .map_err(Self::gateway_error)?;
        if !response.status().is_success() {
            let (status, message) = Self::error_parts(response).await;
            return Err(GatewayError::Http { status, message });
        }
        let dto: ChatResponseDto = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        Ok(dto.into())
    }

    async fn coordinate_chat(
        &self,
        message: &str,
        agents: &[AgentKind],
    ) -> Result<ChatReply, GatewayError> {
        debug!("POST coordinateChat across {} agents", agents.len());
        let request = CoordinateChatRequest {
            message,
            agent_types: agents.iter().map(|a| a.as_str()).collect(),
        };
        let response = self
            .client
            .post(self.url("coordinateChat"))
            .json(&request)
            .send()
            .await
            .map_err(Self::gateway_error)?;
        if !response.status().is_success() {
            let (status, message) = Self::error_parts(response).await;
            return Err(GatewayError::Http { status, message });
        }
        let dto: ChatResponseDto = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        Ok(dto.into())
    }
}

#[async_trait]
impl TaskBackend for HttpAgentBackend {
    async fn list_tasks(&self) -> Result<Vec<AgentTask>, TaskBackendError> {
        let dtos: Vec<TaskDto> = self.get_json("tasks").await?;
        Ok(tasks_into_domain(dtos))
    }

    async fn get_task(&self, id: &TaskId) -> Result<AgentTask, TaskBackendError> {
        let dto: TaskDto = self.get_json(&format!("tasks/{id}")).await?;
        dto.into_domain().map_err(TaskBackendError::InvalidResponse)
    }

    async fn pending_approvals(&self) -> Result<Vec<AgentTaskAction>, TaskBackendError> {
        let dtos: Vec<ActionDto> = self.get_json("tasks/pending-approvals").await?;
        Ok(actions_into_domain(dtos))
    }

    async fn cancel_task(&self, id: &TaskId) -> Result<(), TaskBackendError> {
        self.post_command::<()>(&format!("tasks/{id}/cancel"), None)
            .await
    }

    async fn approve_action(&self, id: &ActionId) -> Result<(), TaskBackendError> {
        self.post_command::<()>(&format!("actions/{id}/approve"), None)
            .await
    }

    async fn reject_action(&self, id: &ActionId, reason: &str) -> Result<(), TaskBackendError> {
        self.post_command(&format!("actions/{id}/reject"), Some(&RejectRequest { reason }))
            .await
    }

    async fn active_agents(&self) -> Result<Vec<ActiveAgentSummary>, TaskBackendError> {
        let dtos: Vec<ActiveAgentDto> = self.get_json("agents/active").await?;
        Ok(activity_into_domain(dtos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_domain::TaskStatus;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn backend_for(server: &MockServer) -> HttpAgentBackend {
        HttpAgentBackend::new(&BackendSettings {
            base_url: server.uri(),
            request_timeout: Duration::from_secs(2),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_chat_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(body_json(serde_json::json!({
                "message": "What is attrition risk?",
                "agentType": "performance"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "Attrition risk is low",
                "conversationId": "conv-1",
                "metadata": { "provider": "anthropic", "latencyMs": 210 }
            })))
            .mount(&server)
            .await;

        let backend = backend_for(&server).await;
        let reply = backend
            .chat("What is attrition risk?", &AgentKind::Performance, None)
            .await
            .unwrap();

        assert_eq!(reply.content, "Attrition risk is low");
        assert_eq!(reply.conversation_id.as_deref(), Some("conv-1"));
        assert_eq!(reply.metadata.unwrap().latency_ms, Some(210));
    }

    #[tokio::test]
    async fn test_chat_non_2xx_maps_to_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let backend = backend_for(&server).await;
        let err = backend
            .chat("q", &AgentKind::Coaching, None)
            .await
            .unwrap_err();
        match err {
            GatewayError::Http { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "bad gateway");
            }
            other => panic!("expected Http error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_chat_malformed_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let backend = backend_for(&server).await;
        let err = backend
            .chat("q", &AgentKind::Coaching, None)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_chat_timeout_maps_to_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "message": "late" }))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let backend = HttpAgentBackend::new(&BackendSettings {
            base_url: server.uri(),
            request_timeout: Duration::from_millis(100),
        })
        .unwrap();
        let err = backend
            .chat("q", &AgentKind::Goals, None)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Timeout));
    }

    #[tokio::test]
    async fn test_coordinate_chat_names_agent_set() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/coordinateChat"))
            .and(body_json(serde_json::json!({
                "message": "Draft Q3 goals",
                "agentTypes": ["performance", "goals"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "merged plan"
            })))
            .mount(&server)
            .await;

        let backend = backend_for(&server).await;
        let reply = backend
            .coordinate_chat(
                "Draft Q3 goals",
                &[AgentKind::Performance, AgentKind::Goals],
            )
            .await
            .unwrap();
        assert_eq!(reply.content, "merged plan");
    }

    #[tokio::test]
    async fn test_list_tasks_skips_malformed_entries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tasks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "id": "t1", "title": "ok", "goal": "g",
                  "agentType": "performance", "status": "executing" },
                { "id": "t2", "title": "broken", "goal": "g",
                  "agentType": "performance", "status": "not-a-status" }
            ])))
            .mount(&server)
            .await;

        let backend = backend_for(&server).await;
        let tasks = backend.list_tasks().await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].status, TaskStatus::Executing);
    }

    #[tokio::test]
    async fn test_get_task_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tasks/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let backend = backend_for(&server).await;
        let err = backend.get_task(&"missing".into()).await.unwrap_err();
        assert!(matches!(err, TaskBackendError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_pending_approvals_route() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tasks/pending-approvals"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
                "id": "a1", "taskId": "t1", "toolName": "update_goal",
                "impactLevel": "write", "status": "awaiting_approval"
            }])))
            .mount(&server)
            .await;

        let backend = backend_for(&server).await;
        let approvals = backend.pending_approvals().await.unwrap();
        assert_eq!(approvals.len(), 1);
        assert!(approvals[0].is_awaiting_approval());
    }

    #[tokio::test]
    async fn test_reject_posts_reason() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/actions/a1/reject"))
            .and(body_json(serde_json::json!({ "reason": "wrong target" })))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let backend = backend_for(&server).await;
        backend
            .reject_action(&"a1".into(), "wrong target")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancel_route() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tasks/t1/cancel"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let backend = backend_for(&server).await;
        backend.cancel_task(&"t1".into()).await.unwrap();
    }

    #[tokio::test]
    async fn test_active_agents_route() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/agents/active"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
                "id": "t1", "agentType": "coaching", "title": "Coaching Alice",
                "status": "executing", "currentStep": 1, "totalSteps": 4,
                "startedAt": "2025-11-03T10:15:00Z"
            }])))
            .mount(&server)
            .await;

        let backend = backend_for(&server).await;
        let activity = backend.active_agents().await.unwrap();
        assert_eq!(activity.len(), 1);
        assert_eq!(activity[0].agent_kind, AgentKind::Coaching);
    }
}
