use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use hands_cli::prompt::pull_request_task;
use hands_cli::{Cli, RunPlan, Settings, build_request, run_task};
use hands_client::agent_server::AgentServerClient;
use hands_client::client::ConversationApi;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hands_cli=info,hands_client=warn,hands_core=warn".into()),
        )
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            std::process::exit(1);
        }
        Err(e) => e.exit(),
    };

    let settings = Settings::from_env();
    tracing::info!(base_url = %settings.base_url, model = %settings.model, "Using agent server");

    let mut client = AgentServerClient::new(&settings.base_url);
    if let Some(key) = &settings.api_key {
        client = client.with_api_key(key);
    }
    let api: Arc<dyn ConversationApi> = Arc::new(client);

    let request = build_request(
        &settings,
        cli.workspace_dir.display().to_string(),
        pull_request_task(Uuid::new_v4()),
    );
    let plan = RunPlan {
        mode: cli.render_mode(),
        wait: cli.wait_options(),
        feed: cli.feed_options(),
        status_api: cli.status_api(),
    };

    run_task(api, &request, plan).await?;
    Ok(())
}
