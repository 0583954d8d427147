use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key used by state update events that carry a full snapshot.
pub const FULL_STATE_KEY: &str = "__full_state__";

/// One event reported by the remote agent, discriminated by `kind`.
///
/// Every payload field is optional so that partially populated events still
/// decode; kinds this crate does not know about land in [`Event::Unknown`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Event {
    #[serde(rename = "MessageEvent")]
    Message(MessageEvent),
    #[serde(rename = "ActionEvent")]
    Action(ActionEvent),
    #[serde(rename = "ObservationEvent")]
    Observation(ObservationEvent),
    #[serde(rename = "AgentErrorEvent")]
    AgentError(AgentErrorEvent),
    #[serde(rename = "PauseEvent")]
    Pause,
    #[serde(rename = "SystemPromptEvent")]
    SystemPrompt,
    #[serde(rename = "ConversationStateUpdateEvent")]
    StateUpdate(StateUpdateEvent),
    #[serde(other)]
    Unknown,
}

impl Event {
    /// Wire name of the variant, or `"unknown"` for the catch-all.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Message(_) => "MessageEvent",
            Event::Action(_) => "ActionEvent",
            Event::Observation(_) => "ObservationEvent",
            Event::AgentError(_) => "AgentErrorEvent",
            Event::Pause => "PauseEvent",
            Event::SystemPrompt => "SystemPromptEvent",
            Event::StateUpdate(_) => "ConversationStateUpdateEvent",
            Event::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_message: Option<LlmMessage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<ContentBlock>>,
}

/// A fragment of message content. Text and image fragments share one shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, alias = "image_urls", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<Value>,
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            image_url: None,
        }
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self {
            text: None,
            image_url: Some(Value::String(url.into())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation: Option<ObservationPayload>,
}

/// Tool output: either raw text, an object with an `output` field, or
/// anything else the server sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObservationPayload {
    Text(String),
    Structured(StructuredObservation),
    Other(Value),
}

impl ObservationPayload {
    /// The displayable text, if the payload carries any.
    pub fn text(&self) -> Option<&str> {
        match self {
            ObservationPayload::Text(text) => Some(text.as_str()).filter(|s| !s.is_empty()),
            ObservationPayload::Structured(obs) => {
                obs.output.as_deref().filter(|s| !s.is_empty())
            }
            ObservationPayload::Other(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredObservation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentErrorEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation: Option<ErrorDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Push update of the remote conversation state.
///
/// With `key == FULL_STATE_KEY` the value is a snapshot object to merge,
/// otherwise it replaces the single field named by `key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateUpdateEvent {
    pub key: String,
    #[serde(default)]
    pub value: Value,
}

impl StateUpdateEvent {
    pub fn is_full_state(&self) -> bool {
        self.key == FULL_STATE_KEY
    }
}
