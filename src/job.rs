// src/job.rs
//! One scheduled run: fetch → pipeline → send → persist.
//!
//! State is written only after the notifier confirms delivery, and never in
//! diagnostic (`--test`) mode.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::digest::TEST_PREFIX;
use crate::ingest::{fetch_all, types::SourceProvider};
use crate::notify::Notifier;
use crate::pipeline::Pipeline;
use crate::state::StateStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// Digest delivered and `recorded` urls persisted.
    Sent { articles: usize, recorded: usize },
    /// Diagnostic run delivered (digest or heartbeat); nothing persisted.
    TestSent { heartbeat: bool },
    /// Nothing new; nothing sent, nothing persisted.
    Skipped,
}

pub async fn run_job(
    providers: &[Box<dyn SourceProvider>],
    pipeline: &Pipeline,
    store: &StateStore,
    notifier: &dyn Notifier,
    now: DateTime<Utc>,
    test_mode: bool,
) -> Result<JobOutcome> {
    // 1) Fetch (provider errors are already absorbed)
    let raw = fetch_all(providers).await;

    // 2) State
    let mut state = store.load().await?;
    let seen = store.seen_set(&state);

    // 3) Filter/classify/assemble
    let out = pipeline.run(raw, &seen, now);

    // 4) Diagnostic mode: always send, never persist
    if test_mode {
        let (message, heartbeat) = match &out.text {
            Some(text) => (format!("{TEST_PREFIX}{text}"), false),
            None => (pipeline.assembler().heartbeat(now), true),
        };
        info!(target: "job", heartbeat, "sending test digest");
        notifier
            .send(&message)
            .await
            .with_context(|| format!("sending test digest via {}", notifier.name()))?;
        return Ok(JobOutcome::TestSent { heartbeat });
    }

    let Some(text) = out.text else {
        info!(target: "job", "no new relevant articles, skipping");
        return Ok(JobOutcome::Skipped);
    };

    // 5) Send; a failure aborts before state is touched
    notifier
        .send(&text)
        .await
        .with_context(|| format!("sending digest via {}", notifier.name()))?;

    // 6) Persist
    store.record_delivery(&mut state, &out.newly_seen, now.date_naive());
    store.save(&state).await?;

    let articles = out.digest.as_ref().map_or(0, |d| d.article_count());
    info!(target: "job", articles, recorded = out.newly_seen.len(), "digest delivered");
    Ok(JobOutcome::Sent {
        articles,
        recorded: out.newly_seen.len(),
    })
}
