pub mod agent_server;
pub mod client;
pub mod conversation;
pub mod feed;
pub mod mock;
pub mod state;
pub mod status;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::agent_server::AgentServerClient;
    pub use crate::client::ConversationApi;
    pub use crate::conversation::Conversation;
    pub use crate::feed::{EventSink, FeedOptions};
    pub use crate::mock::MockConversationApi;
    pub use crate::state::RemoteState;
    pub use crate::status::{RemoteStatusSource, StatusApi};
    pub use crate::types::{
        AgentSpec, ContentPart, ConversationInfo, CreateConversationRequest, EventPage,
        InitialMessage, LlmSpec, ToolSpec, WorkspaceSpec,
    };
}
