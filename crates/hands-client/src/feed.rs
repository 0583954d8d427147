use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::oneshot;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use hands_core::error::Result;
use hands_core::event::Event;
use hands_core::stats::EventTally;

use crate::client::ConversationApi;
use crate::state::RemoteState;

/// Per-event callback. Invoked from the feed task; must not block.
pub type EventSink = Arc<dyn Fn(&Event) + Send + Sync>;

/// Configuration for a conversation's event feed.
#[derive(Debug, Clone)]
pub struct FeedOptions {
    /// Delay between event searches.
    pub poll_interval: Duration,
    /// Page size requested from the server.
    pub page_limit: u32,
    /// How long a cached conversation info document stays valid.
    pub state_max_age: Duration,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            page_limit: 100,
            state_max_age: Duration::from_secs(1),
        }
    }
}

impl FeedOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_page_limit(mut self, limit: u32) -> Self {
        self.page_limit = limit;
        self
    }

    pub fn with_state_max_age(mut self, max_age: Duration) -> Self {
        self.state_max_age = max_age;
        self
    }
}

/// Tails the server's event log and hands each new event to the sink.
pub(crate) struct EventFeed {
    api: Arc<dyn ConversationApi>,
    conversation_id: String,
    state: Arc<RemoteState>,
    tally: Arc<EventTally>,
    sink: EventSink,
    page_limit: u32,
    cursor: Option<String>,
    seen: HashSet<String>,
}

impl EventFeed {
    pub(crate) fn new(
        api: Arc<dyn ConversationApi>,
        state: Arc<RemoteState>,
        tally: Arc<EventTally>,
        sink: EventSink,
        page_limit: u32,
    ) -> Self {
        Self {
            api,
            conversation_id: state.conversation_id().to_string(),
            state,
            tally,
            sink,
            page_limit,
            cursor: None,
            seen: HashSet::new(),
        }
    }

    /// Fetch every page available right now. Returns the number of new events.
    ///
    /// The cursor only advances to a `next_page_id` the server handed out,
    /// so the last page is searched again next time and already seen items
    /// are skipped.
    pub(crate) async fn drain(&mut self) -> Result<usize> {
        let mut dispatched = 0;
        loop {
            let page = self
                .api
                .search_events(&self.conversation_id, self.cursor.as_deref(), self.page_limit)
                .await?;

            for raw in page.items {
                if self.dispatch(raw).await {
                    dispatched += 1;
                }
            }

            match page.next_page_id {
                Some(next) if self.cursor.as_deref() != Some(next.as_str()) => {
                    self.cursor = Some(next);
                }
                _ => break,
            }
        }
        if dispatched > 0 {
            debug!(id = %self.conversation_id, dispatched, "Dispatched events");
        }
        Ok(dispatched)
    }

    async fn dispatch(&mut self, raw: Value) -> bool {
        let key = match raw.get("id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => raw.to_string(),
        };
        if !self.seen.insert(key) {
            return false;
        }

        let event = match serde_json::from_value::<Event>(raw) {
            Ok(event) => event,
            Err(e) => {
                warn!(id = %self.conversation_id, error = %e, "Skipping undecodable event");
                return false;
            }
        };

        if let Event::StateUpdate(update) = &event {
            self.state.apply_update(update).await;
        }
        self.tally.record(&event);
        (self.sink)(&event);
        true
    }

    /// Poll until `shutdown` fires, then drain once more and stop.
    pub(crate) async fn run(mut self, mut shutdown: oneshot::Receiver<()>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.drain().await {
                        warn!(id = %self.conversation_id, error = %e, "Event search failed");
                    }
                }
                _ = &mut shutdown => {
                    if let Err(e) = self.drain().await {
                        warn!(id = %self.conversation_id, error = %e, "Final event drain failed");
                    }
                    break;
                }
            }
        }
    }
}
