// src/ingest/providers/rss.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::ingest::normalize_text;
use crate::ingest::types::{Article, SourceProvider};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

const GOOGLE_NEWS_SEARCH: &str = "https://news.google.com/rss/search";

/// Google News RSS search URL for a French-language query.
pub fn google_news_url(query: &str) -> Result<String> {
    let url = url::Url::parse_with_params(
        GOOGLE_NEWS_SEARCH,
        &[("q", query), ("hl", "fr"), ("gl", "FR"), ("ceid", "FR:fr")],
    )
    .context("building google news url")?;
    Ok(url.to_string())
}

/// RSS feed provider over one or more feed URLs (or fixture documents in tests).
/// Only the first `per_feed_limit` items of each feed are taken.
pub struct RssProvider {
    name: String,
    per_feed_limit: usize,
    mode: Mode,
}

enum Mode {
    Fixture(Vec<String>),
    Http {
        urls: Vec<String>,
        client: reqwest::Client,
    },
}

impl RssProvider {
    pub fn from_urls(
        name: impl Into<String>,
        urls: Vec<String>,
        per_feed_limit: usize,
        client: reqwest::Client,
    ) -> Self {
        Self {
            name: name.into(),
            per_feed_limit,
            mode: Mode::Http { urls, client },
        }
    }

    /// Build from raw XML documents; each document counts as one feed.
    pub fn from_fixtures(name: impl Into<String>, docs: &[&str], per_feed_limit: usize) -> Self {
        Self {
            name: name.into(),
            per_feed_limit,
            mode: Mode::Fixture(docs.iter().map(|s| s.to_string()).collect()),
        }
    }

    fn parse_items_from_str(&self, s: &str) -> Result<Vec<Article>> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(s);
        let rss: Rss = from_str(&xml_clean)
            .with_context(|| format!("parsing {} rss xml", self.name))?;

        let out: Vec<Article> = rss
            .channel
            .item
            .into_iter()
            .take(self.per_feed_limit)
            .map(|it| Article {
                title: normalize_text(it.title.as_deref().unwrap_or_default()),
                url: it.link.map(|l| l.trim().to_string()).unwrap_or_default(),
                source: self.name.clone(),
                published: it
                    .pub_date
                    .map(|d| d.trim().to_string())
                    .unwrap_or_default(),
            })
            .collect();

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("digest_parse_ms").record(ms);
        Ok(out)
    }

    async fn fetch_body(client: &reqwest::Client, url: &str) -> Result<String> {
        client
            .get(url)
            .send()
            .await
            .context("rss http get()")?
            .error_for_status()
            .context("rss http non-2xx")?
            .text()
            .await
            .context("rss http .text()")
    }
}

#[async_trait]
impl SourceProvider for RssProvider {
    async fn fetch_latest(&self) -> Result<Vec<Article>> {
        match &self.mode {
            Mode::Fixture(docs) => {
                let mut out = Vec::new();
                for d in docs {
                    out.extend(self.parse_items_from_str(d)?);
                }
                Ok(out)
            }
            Mode::Http { urls, client } => {
                // One broken feed must not hide the others of the same provider.
                let mut out = Vec::new();
                for url in urls {
                    let parsed = match Self::fetch_body(client, url).await {
                        Ok(body) => self.parse_items_from_str(&body),
                        Err(e) => Err(e),
                    };
                    match parsed {
                        Ok(mut v) => out.append(&mut v),
                        Err(e) => {
                            tracing::warn!(
                                target: "ingest",
                                error = ?e, provider = %self.name, %url,
                                "feed skipped"
                            );
                            counter!("digest_provider_errors_total").increment(1);
                        }
                    }
                }
                Ok(out)
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// quick-xml only knows the five XML entities; feeds routinely carry HTML ones.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&laquo;", "\u{00AB}")
        .replace("&raquo;", "\u{00BB}")
        .replace("&rsquo;", "'")
        .replace("&lsquo;", "'")
        .replace("&eacute;", "\u{00E9}")
        .replace("&egrave;", "\u{00E8}")
        .replace("&agrave;", "\u{00E0}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>t</title>
<item><title>Foire de Matha</title><link>https://ex.test/a</link><pubDate>Mon, 06 Oct 2025 08:00:00 GMT</pubDate></item>
<item><title><![CDATA[Aumagne &amp; alentours]]></title><link>https://ex.test/b</link></item>
<item><title>Third</title><link>https://ex.test/c</link></item>
</channel></rss>"#;

    #[tokio::test]
    async fn takes_first_items_only() {
        let p = RssProvider::from_fixtures("SudOuest", &[FEED], 2);
        let items = p.fetch_latest().await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Foire de Matha");
        assert_eq!(items[0].published, "Mon, 06 Oct 2025 08:00:00 GMT");
        assert_eq!(items[1].published, "");
        assert!(items.iter().all(|a| a.source == "SudOuest"));
    }

    #[test]
    fn google_news_url_encodes_query() {
        let u = google_news_url("Aumagne 17770").unwrap();
        assert!(u.starts_with("https://news.google.com/rss/search?q=Aumagne+17770"));
        assert!(u.ends_with("&hl=fr&gl=FR&ceid=FR%3Afr"));
    }
}
