// src/state.rs
//! Persisted run state: `{ "last_date": "YYYY-MM-DD", "seen_urls": [...] }`.
//! Read once at run start, written once after a confirmed send.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::dedup::{SeenSet, DEFAULT_MAX_SEEN};

pub const DEFAULT_STATE_PATH: &str = "state/last_digest.json";
pub const ENV_STATE_PATH: &str = "DIGEST_STATE_PATH";
pub const ENV_MAX_SEEN: &str = "DIGEST_MAX_SEEN_URLS";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct DigestState {
    #[serde(default)]
    pub last_date: String,
    #[serde(default)]
    pub seen_urls: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
    max_seen: usize,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>, max_seen: usize) -> Self {
        Self {
            path: path.into(),
            max_seen: max_seen.max(1),
        }
    }

    /// $DIGEST_STATE_PATH / $DIGEST_MAX_SEEN_URLS with the documented defaults.
    pub fn from_env() -> Self {
        let path = std::env::var(ENV_STATE_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_STATE_PATH));
        let max_seen = std::env::var(ENV_MAX_SEEN)
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_SEEN);
        Self::new(path, max_seen)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn max_seen(&self) -> usize {
        self.max_seen
    }

    /// Missing file → fresh state. Unreadable or corrupt file → error.
    pub async fn load(&self) -> Result<DigestState> {
        match fs::read_to_string(&self.path).await {
            Ok(s) => serde_json::from_str(&s)
                .with_context(|| format!("parsing state file {}", self.path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(DigestState::default()),
            Err(e) => {
                Err(e).with_context(|| format!("reading state file {}", self.path.display()))
            }
        }
    }

    pub fn seen_set(&self, state: &DigestState) -> SeenSet {
        SeenSet::from_persisted(state.seen_urls.iter().cloned(), self.max_seen)
    }

    /// Merge delivered urls (oldest dropped past the cap) and stamp the date.
    pub fn record_delivery(&self, state: &mut DigestState, urls: &[String], today: NaiveDate) {
        let mut seen = self.seen_set(state);
        seen.extend(urls.iter().cloned());
        state.seen_urls = seen.to_vec();
        state.last_date = today.format("%Y-%m-%d").to_string();
    }

    pub async fn save(&self, state: &DigestState) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating state dir {}", dir.display()))?;
        }
        let mut state = state.clone();
        if state.seen_urls.len() > self.max_seen {
            let excess = state.seen_urls.len() - self.max_seen;
            state.seen_urls.drain(0..excess);
        }
        let body = serde_json::to_vec_pretty(&state).context("serializing state")?;
        fs::write(&self.path, body)
            .await
            .with_context(|| format!("writing state file {}", self.path.display()))?;
        tracing::info!(
            target: "state",
            path = %self.path.display(),
            seen = state.seen_urls.len(),
            "state saved"
        );
        Ok(())
    }
}
