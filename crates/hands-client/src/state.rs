use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use hands_core::error::{ApiError, HandsError, Result};
use hands_core::event::StateUpdateEvent;

use crate::client::ConversationApi;

const DEFAULT_MAX_AGE: Duration = Duration::from_secs(1);

struct CachedInfo {
    info: Map<String, Value>,
    refreshed: Instant,
}

/// Cached view of a remote conversation's info document.
///
/// Reads and pushed updates are serialized through one fair async mutex, so
/// at most one fetch is in flight and waiters are served in arrival order.
/// A cached document older than `max_age` is refetched on the next read.
pub struct RemoteState {
    api: Arc<dyn ConversationApi>,
    conversation_id: String,
    max_age: Duration,
    cache: Mutex<Option<CachedInfo>>,
}

impl RemoteState {
    pub fn new(api: Arc<dyn ConversationApi>, conversation_id: impl Into<String>) -> Self {
        Self {
            api,
            conversation_id: conversation_id.into(),
            max_age: DEFAULT_MAX_AGE,
            cache: Mutex::new(None),
        }
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// Current conversation info, from cache when fresh enough.
    pub async fn conversation_info(&self) -> Result<Value> {
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref() {
            if cached.refreshed.elapsed() <= self.max_age {
                return Ok(Value::Object(cached.info.clone()));
            }
        }

        debug!(id = %self.conversation_id, "Refreshing conversation info");
        let response = self.api.get_conversation(&self.conversation_id).await?;
        let info = unwrap_full_state(response)?;
        *cache = Some(CachedInfo {
            info: info.clone(),
            refreshed: Instant::now(),
        });
        Ok(Value::Object(info))
    }

    /// Merge a pushed state update into the cache.
    pub async fn apply_update(&self, update: &StateUpdateEvent) {
        if update.is_full_state() && !update.value.is_object() {
            warn!(value = %update.value, "Ignoring non-object full state snapshot");
            return;
        }

        let mut cache = self.cache.lock().await;
        let cached = cache.get_or_insert_with(|| CachedInfo {
            info: Map::new(),
            refreshed: Instant::now(),
        });

        match (&update.value, update.is_full_state()) {
            (Value::Object(snapshot), true) => {
                for (key, value) in snapshot {
                    cached.info.insert(key.clone(), value.clone());
                }
            }
            (value, _) => {
                cached.info.insert(update.key.clone(), value.clone());
            }
        }
        cached.refreshed = Instant::now();
    }

    /// Drop the cached document so the next read goes to the server.
    pub async fn invalidate(&self) {
        *self.cache.lock().await = None;
    }
}

/// Some server versions wrap the document as `{"full_state": {...}}`.
fn unwrap_full_state(response: Value) -> Result<Map<String, Value>> {
    let mut object = match response {
        Value::Object(object) => object,
        other => {
            return Err(HandsError::Api(ApiError::InvalidResponse(format!(
                "conversation info is not an object: {other}"
            ))));
        }
    };
    match object.remove("full_state") {
        Some(Value::Object(inner)) => Ok(inner),
        Some(other) => {
            object.insert("full_state".into(), other);
            Ok(object)
        }
        None => Ok(object),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockConversationApi;
    use serde_json::json;

    fn state_with(api: &Arc<MockConversationApi>) -> RemoteState {
        RemoteState::new(Arc::clone(api) as Arc<dyn ConversationApi>, "conv-1")
    }

    #[test]
    fn unwrap_full_state_handles_both_shapes() {
        let wrapped = unwrap_full_state(json!({"full_state": {"execution_status": "idle"}}))
            .unwrap();
        assert_eq!(wrapped["execution_status"], "idle");

        let plain = unwrap_full_state(json!({"execution_status": "running"})).unwrap();
        assert_eq!(plain["execution_status"], "running");

        let null_wrapper = unwrap_full_state(json!({"full_state": null, "id": "x"})).unwrap();
        assert_eq!(null_wrapper["id"], "x");

        assert!(unwrap_full_state(json!("nope")).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_cache_is_reused() {
        let api = Arc::new(
            MockConversationApi::new("conv-1")
                .with_info(json!({"execution_status": "running"}))
                .with_info(json!({"execution_status": "finished"})),
        );
        let state = state_with(&api);

        let first = state.conversation_info().await.unwrap();
        let second = state.conversation_info().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(api.get_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_cache_is_refetched() {
        let api = Arc::new(
            MockConversationApi::new("conv-1")
                .with_info(json!({"execution_status": "running"}))
                .with_info(json!({"execution_status": "finished"})),
        );
        let state = state_with(&api).with_max_age(Duration::from_millis(500));

        state.conversation_info().await.unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;
        let info = state.conversation_info().await.unwrap();

        assert_eq!(info["execution_status"], "finished");
        assert_eq!(api.get_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_reads_share_one_fetch() {
        let api = Arc::new(
            MockConversationApi::new("conv-1").with_info(json!({"execution_status": "running"})),
        );
        let state = Arc::new(state_with(&api));

        let reads = (0..8).map(|_| {
            let state = Arc::clone(&state);
            tokio::spawn(async move { state.conversation_info().await })
        });
        for read in futures::future::join_all(reads).await {
            assert_eq!(read.unwrap().unwrap()["execution_status"], "running");
        }
        assert_eq!(api.get_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn pushed_updates_are_visible_without_fetch() {
        let api = Arc::new(MockConversationApi::new("conv-1"));
        let state = state_with(&api);

        state
            .apply_update(&StateUpdateEvent {
                key: "__full_state__".into(),
                value: json!({"execution_status": "running", "agent": {"kind": "Agent"}}),
            })
            .await;
        state
            .apply_update(&StateUpdateEvent {
                key: "execution_status".into(),
                value: json!("finished"),
            })
            .await;

        let info = state.conversation_info().await.unwrap();
        assert_eq!(info["execution_status"], "finished");
        assert_eq!(info["agent"]["kind"], "Agent");
        assert_eq!(api.get_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn non_object_snapshot_is_ignored() {
        let api = Arc::new(
            MockConversationApi::new("conv-1").with_info(json!({"execution_status": "idle"})),
        );
        let state = state_with(&api);
        state.conversation_info().await.unwrap();

        state
            .apply_update(&StateUpdateEvent {
                key: "__full_state__".into(),
                value: json!([1, 2, 3]),
            })
            .await;

        let info = state.conversation_info().await.unwrap();
        assert_eq!(info, json!({"execution_status": "idle"}));
    }

    #[tokio::test(start_paused = true)]
    async fn invalidate_forces_refetch() {
        let api = Arc::new(
            MockConversationApi::new("conv-1")
                .with_info(json!({"execution_status": "running"}))
                .with_info(json!({"execution_status": "paused"})),
        );
        let state = state_with(&api);

        state.conversation_info().await.unwrap();
        state.invalidate().await;
        let info = state.conversation_info().await.unwrap();
        assert_eq!(info["execution_status"], "paused");
        assert_eq!(api.get_calls(), 2);
    }
}
