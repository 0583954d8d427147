use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::info;

use hands_core::error::{HandsError, Result};
use hands_core::stats::{ConversationStats, EventTally};

use crate::client::ConversationApi;
use crate::feed::{EventFeed, FeedOptions};
use crate::state::RemoteState;
use crate::status::{RemoteStatusSource, StatusApi};
use crate::types::CreateConversationRequest;

pub use crate::feed::EventSink;

struct FeedHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// A running remote conversation with its event feed attached.
pub struct Conversation {
    id: String,
    state: Arc<RemoteState>,
    tally: Arc<EventTally>,
    feed: Option<FeedHandle>,
}

impl Conversation {
    /// Create the conversation on the server and start tailing its events.
    pub async fn start(
        api: Arc<dyn ConversationApi>,
        request: &CreateConversationRequest,
        sink: EventSink,
        options: FeedOptions,
    ) -> Result<Self> {
        let created = api.create_conversation(request).await?;

        let state = Arc::new(
            RemoteState::new(Arc::clone(&api), created.id.clone())
                .with_max_age(options.state_max_age),
        );
        let tally = Arc::new(EventTally::new());
        let feed = EventFeed::new(
            api,
            Arc::clone(&state),
            Arc::clone(&tally),
            sink,
            options.page_limit,
        );

        let (shutdown, rx) = oneshot::channel();
        let task = tokio::spawn(feed.run(rx, options.poll_interval));
        info!(id = %created.id, interval = ?options.poll_interval, "Event feed started");

        Ok(Self {
            id: created.id,
            state,
            tally,
            feed: Some(FeedHandle { shutdown, task }),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> Arc<RemoteState> {
        Arc::clone(&self.state)
    }

    /// Status source reading this conversation through the given API shape.
    pub fn status_source(&self, api: StatusApi) -> RemoteStatusSource {
        RemoteStatusSource::new(self.state(), api)
    }

    /// Counts of the events received so far.
    pub fn stats(&self) -> ConversationStats {
        self.tally.snapshot()
    }

    /// Stop the event feed after one final drain and return the final counts.
    pub async fn close(mut self) -> Result<ConversationStats> {
        if let Some(feed) = self.feed.take() {
            // The feed may already be gone; the join below reports why.
            let _ = feed.shutdown.send(());
            feed.task
                .await
                .map_err(|e| HandsError::Other(format!("event feed task failed: {e}")))?;
        }
        let stats = self.stats();
        info!(
            id = %self.id,
            total_events = stats.total_events,
            "Conversation closed"
        );
        Ok(stats)
    }
}

impl Drop for Conversation {
    fn drop(&mut self) {
        if let Some(feed) = self.feed.take() {
            feed.task.abort();
        }
    }
}
