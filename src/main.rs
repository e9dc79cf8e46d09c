//! Local news digest: binary entrypoint.
//! One invocation = one run; scheduling is left to cron/systemd timers.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use local_news_digest::config::DigestConfig;
use local_news_digest::ingest::config::SourcesConfig;
use local_news_digest::notify::TelegramNotifier;
use local_news_digest::state::StateStore;
use local_news_digest::{run_job, JobOutcome, Pipeline};

#[derive(Debug, Parser)]
#[command(name = "local-news-digest", about = "Fetch, filter and post the local news digest")]
struct Cli {
    /// Diagnostic run: always send (digest or heartbeat), never update state.
    #[arg(long)]
    test: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("ingest=info,pipeline=info,job=info,state=info,notify=info,warn")
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();

    let digest_cfg = DigestConfig::load_default()?;
    let sources = SourcesConfig::load_default()?;
    let providers = sources.build_providers()?;
    let pipeline = Pipeline::from_config(&digest_cfg);
    let store = StateStore::from_env();
    let notifier = TelegramNotifier::from_env();

    let outcome = run_job(
        &providers,
        &pipeline,
        &store,
        &notifier,
        chrono::Utc::now(),
        cli.test,
    )
    .await?;

    match outcome {
        JobOutcome::Sent { articles, recorded } => {
            tracing::info!(target: "job", articles, recorded, "done")
        }
        JobOutcome::TestSent { heartbeat } => {
            tracing::info!(target: "job", heartbeat, "test digest sent")
        }
        JobOutcome::Skipped => tracing::info!(target: "job", "nothing to send"),
    }
    Ok(())
}
