// src/ingest/config.rs
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ingest::providers::html_links::{HtmlLinksProvider, LinkRule};
use crate::ingest::providers::rss::{google_news_url, RssProvider};
use crate::ingest::types::SourceProvider;

pub const ENV_SOURCES_CONFIG_PATH: &str = "SOURCES_CONFIG_PATH";
pub const DEFAULT_SOURCES_CONFIG_PATH: &str = "config/sources.toml";

/// Built-in source list, identical to the shipped `config/sources.toml`.
const SEED_TOML: &str = include_str!("../../config/sources.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    #[serde(default)]
    pub http: HttpCfg,
    #[serde(default)]
    pub rss: Vec<RssSourceCfg>,
    #[serde(default)]
    pub html: Vec<HtmlSourceCfg>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpCfg {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpCfg {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; LocalNewsDigestBot/1.0)".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_per_feed_limit() -> usize {
    20
}
fn default_min_title_len() -> usize {
    15
}
fn default_limit() -> usize {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct RssSourceCfg {
    pub name: String,
    /// Plain feed URLs.
    #[serde(default)]
    pub urls: Vec<String>,
    /// Google News search queries, each expanded to a search-feed URL.
    #[serde(default)]
    pub google_news_queries: Vec<String>,
    #[serde(default = "default_per_feed_limit")]
    pub per_feed_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HtmlSourceCfg {
    pub name: String,
    pub urls: Vec<String>,
    #[serde(default = "default_min_title_len")]
    pub min_title_len: usize,
    #[serde(default)]
    pub require_path: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl SourcesConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing sources config")
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading sources config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// $SOURCES_CONFIG_PATH → config/sources.toml → built-in seed.
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_SOURCES_CONFIG_PATH) {
            return Self::load_from(&PathBuf::from(p));
        }
        let p = PathBuf::from(DEFAULT_SOURCES_CONFIG_PATH);
        if p.exists() {
            return Self::load_from(&p);
        }
        Self::from_toml_str(SEED_TOML)
    }

    /// Instantiate HTTP-backed providers in config order (RSS first, then pages).
    pub fn build_providers(&self) -> Result<Vec<Box<dyn SourceProvider>>> {
        let client = reqwest::Client::builder()
            .user_agent(self.http.user_agent.clone())
            .timeout(Duration::from_secs(self.http.timeout_secs))
            .build()
            .context("building http client")?;

        let mut out: Vec<Box<dyn SourceProvider>> = Vec::new();
        for r in &self.rss {
            let mut urls = Vec::with_capacity(r.google_news_queries.len() + r.urls.len());
            for q in &r.google_news_queries {
                urls.push(google_news_url(q)?);
            }
            urls.extend(r.urls.iter().cloned());
            out.push(Box::new(RssProvider::from_urls(
                r.name.clone(),
                urls,
                r.per_feed_limit,
                client.clone(),
            )));
        }
        for h in &self.html {
            let rule = LinkRule {
                min_title_len: h.min_title_len,
                require_path: h.require_path.clone().filter(|s| !s.is_empty()),
                limit: h.limit,
            };
            out.push(Box::new(HtmlLinksProvider::from_urls(
                h.name.clone(),
                h.urls.clone(),
                rule,
                client.clone(),
            )));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_parses_and_builds_all_sources() {
        let cfg = SourcesConfig::from_toml_str(SEED_TOML).unwrap();
        assert_eq!(cfg.rss.len(), 2);
        assert_eq!(cfg.html.len(), 3);
        assert_eq!(cfg.http.timeout_secs, 10);
        let providers = cfg.build_providers().unwrap();
        let names: Vec<_> = providers.iter().map(|p| p.name().to_string()).collect();
        assert_eq!(
            names,
            vec![
                "Google News",
                "SudOuest",
                "France Bleu",
                "Mairie Aumagne",
                "Vals de Saintonge"
            ]
        );
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let cfg = SourcesConfig::from_toml_str(
            r#"
[[html]]
name = "X"
urls = ["https://x.test/"]
"#,
        )
        .unwrap();
        assert!(cfg.rss.is_empty());
        assert_eq!(cfg.html[0].min_title_len, 15);
        assert_eq!(cfg.html[0].limit, 10);
        assert!(cfg.http.user_agent.contains("LocalNewsDigestBot"));
    }
}
