// src/ingest/types.rs
use anyhow::Result;

/// One candidate article as produced by a source provider.
///
/// `url` is the identity key for deduplication and may be empty.
/// `published` is free-form text and may be empty.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub url: String,
    pub source: String,    // e.g., "Google News", "SudOuest"
    pub published: String, // raw date string, unparsed
}

impl Article {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        source: impl Into<String>,
        published: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            source: source.into(),
            published: published.into(),
        }
    }

    /// Lower-cased `title + " " + url`, the buffer every perimeter/keyword test runs on.
    pub fn match_buffer(&self) -> String {
        format!("{} {}", self.title, self.url).to_lowercase()
    }
}

#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<Article>>;
    fn name(&self) -> &str;
}
