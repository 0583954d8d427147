pub mod config;
pub mod error;
pub mod event;
pub mod format;
pub mod stats;
pub mod status;
pub mod wait;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::WaitOptions;
    pub use crate::error::{ApiError, HandsError, Result, WaitError};
    pub use crate::event::{Action, ContentBlock, Event, LlmMessage, ObservationPayload};
    pub use crate::format::{RenderMode, format_event, format_status};
    pub use crate::stats::{ConversationStats, EventTally};
    pub use crate::status::{AgentStatus, StatusSource};
    pub use crate::wait::wait_for_completion;
}
