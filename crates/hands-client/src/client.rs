use async_trait::async_trait;
use serde_json::Value;

use hands_core::error::Result;

use crate::types::{ConversationInfo, CreateConversationRequest, EventPage};

/// The slice of the agent server REST API this crate relies on.
#[async_trait]
pub trait ConversationApi: Send + Sync {
    /// POST /api/conversations: create and, with an initial message, start a conversation.
    async fn create_conversation(
        &self,
        request: &CreateConversationRequest,
    ) -> Result<ConversationInfo>;

    /// GET /api/conversations/{id}: raw conversation info document.
    async fn get_conversation(&self, conversation_id: &str) -> Result<Value>;

    /// GET /api/conversations/{id}/events/search: one page of events starting at `page_id`.
    async fn search_events(
        &self,
        conversation_id: &str,
        page_id: Option<&str>,
        limit: u32,
    ) -> Result<EventPage>;
}
