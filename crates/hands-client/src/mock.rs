use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use hands_core::error::{ApiError, HandsError, Result};

use crate::client::ConversationApi;
use crate::types::{ConversationInfo, CreateConversationRequest, EventPage};

enum InfoReply {
    Info(Value),
    Fail(String),
}

/// Scripted [`ConversationApi`] for testing without HTTP.
///
/// Info documents and event pages are served in the order they were added.
/// Once the info script runs out the last document is repeated (a finished
/// conversation if none was ever scripted); once the event script runs out
/// every search returns an empty final page.
pub struct MockConversationApi {
    conversation_id: String,
    infos: Mutex<VecDeque<InfoReply>>,
    last_info: Mutex<Option<Value>>,
    pages: Mutex<VecDeque<std::result::Result<EventPage, String>>>,
    created: Mutex<Vec<CreateConversationRequest>>,
    page_requests: Mutex<Vec<Option<String>>>,
    get_calls: AtomicUsize,
}

impl MockConversationApi {
    pub fn new(conversation_id: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            infos: Mutex::new(VecDeque::new()),
            last_info: Mutex::new(None),
            pages: Mutex::new(VecDeque::new()),
            created: Mutex::new(Vec::new()),
            page_requests: Mutex::new(Vec::new()),
            get_calls: AtomicUsize::new(0),
        }
    }

    /// Queue a conversation info document.
    pub fn with_info(self, info: Value) -> Self {
        self.infos.lock().unwrap().push_back(InfoReply::Info(info));
        self
    }

    /// Queue a shorthand info document `{"execution_status": status}`.
    pub fn with_status(self, status: &str) -> Self {
        self.with_info(json!({ "execution_status": status }))
    }

    /// Queue a failed info fetch.
    pub fn with_info_failure(self, message: impl Into<String>) -> Self {
        self.infos
            .lock()
            .unwrap()
            .push_back(InfoReply::Fail(message.into()));
        self
    }

    /// Queue a page of raw events.
    pub fn with_event_page(self, items: Vec<Value>, next_page_id: Option<&str>) -> Self {
        self.pages.lock().unwrap().push_back(Ok(EventPage {
            items,
            next_page_id: next_page_id.map(Into::into),
        }));
        self
    }

    /// Queue a failed event search.
    pub fn with_event_failure(self, message: impl Into<String>) -> Self {
        self.pages.lock().unwrap().push_back(Err(message.into()));
        self
    }

    /// Number of `get_conversation` calls served so far.
    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    /// Requests received by `create_conversation`.
    pub fn created_requests(&self) -> Vec<CreateConversationRequest> {
        self.created.lock().unwrap().clone()
    }

    /// `page_id` of every event search, in call order.
    pub fn page_requests(&self) -> Vec<Option<String>> {
        self.page_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConversationApi for MockConversationApi {
    async fn create_conversation(
        &self,
        request: &CreateConversationRequest,
    ) -> Result<ConversationInfo> {
        self.created.lock().unwrap().push(request.clone());
        Ok(ConversationInfo {
            id: self.conversation_id.clone(),
            fields: Map::new(),
        })
    }

    async fn get_conversation(&self, _conversation_id: &str) -> Result<Value> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.infos.lock().unwrap().pop_front();
        match reply {
            Some(InfoReply::Info(info)) => {
                *self.last_info.lock().unwrap() = Some(info.clone());
                Ok(info)
            }
            Some(InfoReply::Fail(message)) => Err(HandsError::Api(ApiError::Request(message))),
            None => Ok(self
                .last_info
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| json!({ "execution_status": "finished" }))),
        }
    }

    async fn search_events(
        &self,
        _conversation_id: &str,
        page_id: Option<&str>,
        _limit: u32,
    ) -> Result<EventPage> {
        self.page_requests
            .lock()
            .unwrap()
            .push(page_id.map(Into::into));
        match self.pages.lock().unwrap().pop_front() {
            Some(Ok(page)) => Ok(page),
            Some(Err(message)) => Err(HandsError::Api(ApiError::Request(message))),
            None => Ok(EventPage::default()),
        }
    }
}
