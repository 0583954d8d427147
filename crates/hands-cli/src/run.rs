use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use hands_client::client::ConversationApi;
use hands_client::conversation::Conversation;
use hands_client::feed::{EventSink, FeedOptions};
use hands_client::status::StatusApi;
use hands_client::types::{AgentSpec, CreateConversationRequest};
use hands_core::config::WaitOptions;
use hands_core::event::Event;
use hands_core::format::{RenderMode, format_event};
use hands_core::stats::ConversationStats;
use hands_core::status::AgentStatus;
use hands_core::wait::wait_for_completion;

use crate::prompt::AGENT_TOOLS;
use crate::settings::Settings;

/// How to drive and display one conversation.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub mode: RenderMode,
    pub wait: WaitOptions,
    pub feed: FeedOptions,
    pub status_api: StatusApi,
}

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub conversation_id: String,
    pub status: AgentStatus,
    pub stats: ConversationStats,
}

/// Conversation request for `prompt` in `working_dir`, using the configured model.
pub fn build_request(
    settings: &Settings,
    working_dir: impl Into<String>,
    prompt: impl Into<String>,
) -> CreateConversationRequest {
    let agent = AGENT_TOOLS.iter().fold(
        AgentSpec::new(&settings.model, &settings.llm_api_key),
        |agent, tool| agent.with_tool(*tool),
    );
    CreateConversationRequest::new(agent, working_dir).with_initial_message(prompt)
}

fn printing_sink(mode: RenderMode) -> EventSink {
    Arc::new(move |event: &Event| {
        if let Some(line) = format_event(event, mode) {
            println!("{line}");
        }
    })
}

/// Start the conversation, print its events until the agent stops running,
/// then print a summary.
pub async fn run_task(
    api: Arc<dyn ConversationApi>,
    request: &CreateConversationRequest,
    plan: RunPlan,
) -> Result<RunReport> {
    let conversation = Conversation::start(api, request, printing_sink(plan.mode), plan.feed)
        .await
        .context("failed to start conversation")?;
    println!("Conversation ID: {}", conversation.id());

    let wait = plan
        .wait
        .on_status_change(|status| println!("{}", status_line(status)));
    let source = conversation.status_source(plan.status_api);
    let outcome = wait_for_completion(&source, &wait).await;

    let conversation_id = conversation.id().to_string();
    let received = conversation.stats();
    let stats = match conversation.close().await {
        Ok(stats) => stats,
        Err(e) => {
            warn!(id = %conversation_id, error = %e, "Failed to close conversation");
            received
        }
    };
    let status = outcome.context("conversation did not complete")?;

    println!();
    for line in summary_lines(&stats) {
        println!("{line}");
    }
    println!("\n{COMPLETE_LINE}");
    info!(id = %conversation_id, %status, "Run finished");

    Ok(RunReport {
        conversation_id,
        status,
        stats,
    })
}

const COMPLETE_LINE: &str = "[COMPLETE] Task finished.";

/// Status change banner, padded by blank lines.
pub fn status_line(status: &AgentStatus) -> String {
    format!("\n[STATUS] {}\n", status.describe())
}

pub fn summary_lines(stats: &ConversationStats) -> Vec<String> {
    vec![
        "[SUMMARY]".to_string(),
        format!("  Total events: {}", stats.total_events),
        format!("  Messages: {}", stats.message_events),
        format!("  Actions: {}", stats.action_events),
        format!("  Observations: {}", stats.observation_events),
    ]
}
