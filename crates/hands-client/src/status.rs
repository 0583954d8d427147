use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use hands_core::error::{HandsError, Result};
use hands_core::status::StatusSource;

use crate::state::RemoteState;

/// Known shapes of the conversation info document, by where it keeps the
/// agent status. Field renames on the server side are handled here only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusApi {
    /// Current servers: `execution_status`, with `agent_status` as fallback.
    #[default]
    ExecutionStatus,
    /// Older servers: `agent_status` only.
    Legacy,
}

impl StatusApi {
    /// Candidate field names, in lookup order.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            StatusApi::ExecutionStatus => &["execution_status", "agent_status"],
            StatusApi::Legacy => &["agent_status"],
        }
    }

    /// Pull the raw status string out of an info document.
    pub fn extract(self, info: &Value) -> Result<String> {
        self.fields()
            .iter()
            .find_map(|field| {
                info.get(*field)
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
            })
            .map(str::to_string)
            .ok_or_else(|| HandsError::MissingStatus {
                fields: self.fields().join("/"),
                payload: info.to_string(),
            })
    }
}

/// [`StatusSource`] backed by a cached remote conversation.
pub struct RemoteStatusSource {
    state: Arc<RemoteState>,
    api: StatusApi,
}

impl RemoteStatusSource {
    pub fn new(state: Arc<RemoteState>, api: StatusApi) -> Self {
        Self { state, api }
    }
}

#[async_trait]
impl StatusSource for RemoteStatusSource {
    async fn agent_status(&self) -> Result<String> {
        let info = self.state.conversation_info().await?;
        self.api.extract(&info)
    }
}
