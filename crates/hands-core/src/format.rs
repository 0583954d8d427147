//! Rendering of agent events and statuses as console text.
//!
//! Formatting is total: malformed or missing fields degrade to no output
//! rather than an error.

use crate::event::{Action, AgentErrorEvent, Event, LlmMessage, ObservationEvent};
use crate::status::AgentStatus;

const MESSAGE_BUDGET: usize = 200;
const COMMAND_BUDGET: usize = 100;
const THOUGHT_BUDGET: usize = 150;
const OBSERVATION_BUDGET: usize = 150;

const ELLIPSIS: &str = "...";

/// How much of each event to show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// One truncated line per event.
    #[default]
    Preview,
    /// Full content, possibly spanning several lines.
    Transcript,
}

impl RenderMode {
    fn budget(self, preview_budget: usize) -> Option<usize> {
        match self {
            RenderMode::Preview => Some(preview_budget),
            RenderMode::Transcript => None,
        }
    }

    fn content_separator(self) -> &'static str {
        match self {
            RenderMode::Preview => " ",
            RenderMode::Transcript => "\n",
        }
    }
}

/// Render one event, or `None` when the event should not be shown.
pub fn format_event(event: &Event, mode: RenderMode) -> Option<String> {
    match event {
        Event::Message(msg) => format_message(msg.llm_message.as_ref()?, mode),
        Event::Action(action) => Some(format_action(action.action.as_ref()?, mode)),
        Event::Observation(obs) => Some(format_observation(obs, mode)),
        Event::AgentError(err) => Some(format_agent_error(err)),
        Event::Pause => Some("[PAUSED] Agent execution paused".into()),
        Event::SystemPrompt => Some("[SYSTEM] System prompt initialized".into()),
        // Internal state sync and unrecognized kinds are noise.
        Event::StateUpdate(_) | Event::Unknown => None,
    }
}

/// Describe a raw status string; unknown values are returned unchanged.
pub fn format_status(status: &str) -> String {
    AgentStatus::parse(status).describe().to_string()
}

fn format_message(msg: &LlmMessage, mode: RenderMode) -> Option<String> {
    let role = non_empty(&msg.role)
        .map(str::to_uppercase)
        .unwrap_or_else(|| "MESSAGE".into());

    let fragments: Vec<&str> = msg
        .content
        .as_deref()?
        .iter()
        .filter_map(|block| match non_empty(&block.text) {
            Some(text) => Some(text),
            None if block.image_url.is_some() => Some("[image]"),
            None => None,
        })
        .collect();
    let content = fragments.join(mode.content_separator());
    if content.is_empty() {
        return None;
    }

    Some(format!(
        "[{role}] {}",
        truncate(&content, mode.budget(MESSAGE_BUDGET))
    ))
}

fn format_action(action: &Action, mode: RenderMode) -> String {
    let action_type = non_empty(&action.action_type)
        .or_else(|| non_empty(&action.kind))
        .unwrap_or("action");

    let detail = if let Some(command) = non_empty(&action.command) {
        Some(format!(
            "[ACTION:{action_type}] $ {}",
            truncate(command, mode.budget(COMMAND_BUDGET))
        ))
    } else {
        non_empty(&action.path).map(|path| format!("[ACTION:{action_type}] {path}"))
    };
    let thought = non_empty(&action.thought);

    match mode {
        RenderMode::Preview => match (detail, thought) {
            (Some(detail), _) => detail,
            (None, Some(thought)) => {
                format!("[THOUGHT] {}", truncate(thought, Some(THOUGHT_BUDGET)))
            }
            (None, None) => format!("[ACTION:{action_type}]"),
        },
        RenderMode::Transcript => {
            let detail = detail.unwrap_or_else(|| format!("[ACTION:{action_type}]"));
            match thought {
                Some(thought) => format!("[THOUGHT] {thought}\n{detail}"),
                None => detail,
            }
        }
    }
}

fn format_observation(obs: &ObservationEvent, mode: RenderMode) -> String {
    let tool_name = non_empty(&obs.tool_name).unwrap_or("tool");
    match obs.observation.as_ref().and_then(|payload| payload.text()) {
        Some(text) => format!(
            "[RESULT:{tool_name}] {}",
            truncate(text, mode.budget(OBSERVATION_BUDGET))
        ),
        None => format!("[RESULT:{tool_name}] (completed)"),
    }
}

fn format_agent_error(err: &AgentErrorEvent) -> String {
    let detail = err.observation.as_ref();
    let message = detail
        .and_then(|d| non_empty(&d.error))
        .or_else(|| detail.and_then(|d| non_empty(&d.message)))
        .or_else(|| non_empty(&err.error))
        .unwrap_or("Unknown error");
    format!("[ERROR] {message}")
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Cut `text` to at most `budget` characters, marking the cut with `...`.
fn truncate(text: &str, budget: Option<usize>) -> String {
    let Some(budget) = budget else {
        return text.to_string();
    };
    match text.char_indices().nth(budget) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
        None => text.to_string(),
    }
}
