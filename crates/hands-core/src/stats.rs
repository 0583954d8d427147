use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::event::Event;

/// Event counts for one conversation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationStats {
    pub total_events: u64,
    pub message_events: u64,
    pub action_events: u64,
    pub observation_events: u64,
}

/// Lock-free running tally, shared between the event feed and readers.
#[derive(Debug, Default)]
pub struct EventTally {
    total: AtomicU64,
    messages: AtomicU64,
    actions: AtomicU64,
    observations: AtomicU64,
}

impl EventTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: &Event) {
        self.total.fetch_add(1, Ordering::Relaxed);
        let bucket = match event {
            Event::Message(_) => &self.messages,
            Event::Action(_) => &self.actions,
            Event::Observation(_) => &self.observations,
            _ => return,
        };
        bucket.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ConversationStats {
        ConversationStats {
            total_events: self.total.load(Ordering::Relaxed),
            message_events: self.messages.load(Ordering::Relaxed),
            action_events: self.actions.load(Ordering::Relaxed),
            observation_events: self.observations.load(Ordering::Relaxed),
        }
    }
}
