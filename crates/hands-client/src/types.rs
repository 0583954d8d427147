use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// LLM settings for the remote agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmSpec {
    pub model: String,
    pub api_key: String,
}

/// A tool the remote agent may use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Agent definition sent when creating a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub llm: LlmSpec,
    #[serde(default)]
    pub tools: Vec<ToolSpec>,
}

impl AgentSpec {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            llm: LlmSpec {
                model: model.into(),
                api_key: api_key.into(),
            },
            tools: Vec::new(),
        }
    }

    pub fn with_tool(mut self, name: impl Into<String>) -> Self {
        self.tools.push(ToolSpec::new(name));
        self
    }
}

/// Workspace the agent operates in, as seen by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceSpec {
    pub working_dir: String,
}

/// Message content part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
}

/// First user message; the conversation starts running once it is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialMessage {
    pub role: String,
    pub content: Vec<ContentPart>,
}

impl InitialMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: vec![ContentPart::Text { text: text.into() }],
        }
    }
}

/// Request body for `POST /api/conversations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateConversationRequest {
    pub agent: AgentSpec,
    pub workspace: WorkspaceSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_message: Option<InitialMessage>,
}

impl CreateConversationRequest {
    pub fn new(agent: AgentSpec, working_dir: impl Into<String>) -> Self {
        Self {
            agent,
            workspace: WorkspaceSpec {
                working_dir: working_dir.into(),
            },
            initial_message: None,
        }
    }

    pub fn with_initial_message(mut self, text: impl Into<String>) -> Self {
        self.initial_message = Some(InitialMessage::user(text));
        self
    }
}

/// Conversation document returned on creation. Only `id` is interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationInfo {
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// One page of `GET /api/conversations/{id}/events/search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPage {
    #[serde(default)]
    pub items: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_id: Option<String>,
}
