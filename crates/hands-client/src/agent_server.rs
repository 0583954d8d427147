use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use hands_core::error::{ApiError, HandsError, Result};

use crate::client::ConversationApi;
use crate::types::{ConversationInfo, CreateConversationRequest, EventPage};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

const SESSION_API_KEY_HEADER: &str = "X-Session-API-Key";

/// HTTP client for an OpenHands-style agent server.
pub struct AgentServerClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl AgentServerClient {
    /// Create a client for the server at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
            client: reqwest::Client::new(),
        }
    }

    /// Send `key` as the session API key on every request.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn conversations_url(&self) -> String {
        format!("{}/api/conversations", self.base_url)
    }

    fn conversation_url(&self, id: &str) -> String {
        format!("{}/api/conversations/{}", self.base_url, id)
    }

    fn events_search_url(&self, id: &str) -> String {
        format!("{}/api/conversations/{}/events/search", self.base_url, id)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => builder.header(SESSION_API_KEY_HEADER, key),
            None => builder,
        }
    }

    fn map_status_error(status: StatusCode, body: String) -> HandsError {
        match status.as_u16() {
            401 | 403 => HandsError::Api(ApiError::Auth(body)),
            404 => HandsError::Api(ApiError::NotFound(body)),
            _ => HandsError::Api(ApiError::Request(format!("HTTP {}: {}", status, body))),
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self
            .authorize(builder)
            .send()
            .await
            .map_err(|e| HandsError::Api(ApiError::Request(e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read response body".into());
            return Err(Self::map_status_error(status, body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| HandsError::Api(ApiError::InvalidResponse(e.to_string())))
    }
}

#[async_trait]
impl ConversationApi for AgentServerClient {
    async fn create_conversation(
        &self,
        request: &CreateConversationRequest,
    ) -> Result<ConversationInfo> {
        info!(
            model = %request.agent.llm.model,
            working_dir = %request.workspace.working_dir,
            "Creating conversation"
        );
        let created: ConversationInfo = self
            .send_json(self.client.post(self.conversations_url()).json(request))
            .await
            .inspect_err(|e| warn!(error = %e, "Create conversation failed"))?;
        info!(id = %created.id, "Conversation created");
        Ok(created)
    }

    async fn get_conversation(&self, conversation_id: &str) -> Result<Value> {
        debug!(id = %conversation_id, "Fetching conversation info");
        self.send_json(self.client.get(self.conversation_url(conversation_id)))
            .await
    }

    async fn search_events(
        &self,
        conversation_id: &str,
        page_id: Option<&str>,
        limit: u32,
    ) -> Result<EventPage> {
        let mut query = vec![("limit", limit.to_string())];
        if let Some(page_id) = page_id {
            query.push(("page_id", page_id.to_string()));
        }
        self.send_json(
            self.client
                .get(self.events_search_url(conversation_id))
                .query(&query),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_status_error_auth() {
        let err =
            AgentServerClient::map_status_error(StatusCode::UNAUTHORIZED, "bad key".into());
        assert!(matches!(err, HandsError::Api(ApiError::Auth(msg)) if msg == "bad key"));
    }

    #[test]
    fn map_status_error_forbidden() {
        let err = AgentServerClient::map_status_error(StatusCode::FORBIDDEN, "no access".into());
        assert!(matches!(err, HandsError::Api(ApiError::Auth(_))));
    }

    #[test]
    fn map_status_error_not_found() {
        let err = AgentServerClient::map_status_error(StatusCode::NOT_FOUND, "gone".into());
        assert!(matches!(err, HandsError::Api(ApiError::NotFound(_))));
    }

    #[test]
    fn map_status_error_server_error() {
        let err = AgentServerClient::map_status_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "oops".into(),
        );
        assert!(
            matches!(err, HandsError::Api(ApiError::Request(msg)) if msg.contains("500"))
        );
    }

    #[test]
    fn urls_strip_trailing_slash() {
        let client = AgentServerClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(
            client.conversations_url(),
            "http://localhost:8000/api/conversations"
        );
        assert_eq!(
            client.conversation_url("abc"),
            "http://localhost:8000/api/conversations/abc"
        );
        assert_eq!(
            client.events_search_url("abc"),
            "http://localhost:8000/api/conversations/abc/events/search"
        );
    }

    #[test]
    fn api_key_header_is_attached() {
        let client = AgentServerClient::new(DEFAULT_BASE_URL).with_api_key("secret");
        let request = client
            .authorize(client.client.get(client.conversations_url()))
            .build()
            .unwrap();
        assert_eq!(
            request.headers().get(SESSION_API_KEY_HEADER).unwrap(),
            "secret"
        );

        let anonymous = AgentServerClient::new(DEFAULT_BASE_URL);
        let request = anonymous
            .authorize(anonymous.client.get(anonymous.conversations_url()))
            .build()
            .unwrap();
        assert!(request.headers().get(SESSION_API_KEY_HEADER).is_none());
    }
}
