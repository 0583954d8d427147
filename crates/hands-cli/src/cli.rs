use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use hands_client::feed::FeedOptions;
use hands_client::status::StatusApi;
use hands_core::config::WaitOptions;
use hands_core::format::RenderMode;

#[derive(Debug, Parser)]
#[command(name = "hands-pr")]
#[command(about = "Drive a remote coding agent through a branch, commit, push and pull request")]
pub struct Cli {
    /// Workspace directory on the agent server
    pub workspace_dir: PathBuf,

    /// Print full event content instead of one-line previews
    #[arg(long)]
    pub transcript: bool,

    /// Give up after this many seconds
    #[arg(long, default_value_t = 600)]
    pub timeout_secs: u64,

    /// Delay between status checks, in milliseconds
    #[arg(long, default_value_t = 2000)]
    pub poll_interval_ms: u64,

    /// Abort after this many failed status checks in a row
    #[arg(long, default_value_t = 5)]
    pub max_status_errors: u32,

    /// Delay between event searches, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub event_poll_interval_ms: u64,

    /// Read the status from `agent_status` only (older servers)
    #[arg(long)]
    pub legacy_status_field: bool,
}

impl Cli {
    pub fn render_mode(&self) -> RenderMode {
        if self.transcript {
            RenderMode::Transcript
        } else {
            RenderMode::Preview
        }
    }

    pub fn status_api(&self) -> StatusApi {
        if self.legacy_status_field {
            StatusApi::Legacy
        } else {
            StatusApi::ExecutionStatus
        }
    }

    pub fn wait_options(&self) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms))
            .with_max_consecutive_errors(self.max_status_errors)
    }

    pub fn feed_options(&self) -> FeedOptions {
        FeedOptions::new().with_poll_interval(Duration::from_millis(self.event_poll_interval_ms))
    }
}
