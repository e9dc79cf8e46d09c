// src/ingest/providers/html_links.rs
//! Headline scraper for plain HTML pages (town hall site, regional radio,
//! community of communes). Every `a[href]` with a long enough text is taken
//! as an article; these pages carry no dates.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use metrics::counter;
use scraper::{Html, Selector};
use url::Url;

use crate::ingest::normalize_text;
use crate::ingest::types::{Article, SourceProvider};

/// Which anchors count as articles.
#[derive(Debug, Clone)]
pub struct LinkRule {
    /// Link text must be strictly longer than this (in characters).
    pub min_title_len: usize,
    /// If set, the raw href must contain this fragment (e.g. "/infos/").
    pub require_path: Option<String>,
    /// Cap on the total number of links kept across all pages.
    pub limit: usize,
}

impl Default for LinkRule {
    fn default() -> Self {
        Self {
            min_title_len: 15,
            require_path: None,
            limit: 10,
        }
    }
}

/// Extract article links from one HTML document.
pub fn extract_links(html: &str, page_url: &str, source: &str, rule: &LinkRule) -> Result<Vec<Article>> {
    let base = Url::parse(page_url).with_context(|| format!("invalid page url {page_url}"))?;
    let doc = Html::parse_document(html);
    let sel = Selector::parse("a[href]").map_err(|e| anyhow!("anchor selector: {e}"))?;

    let mut out = Vec::new();
    for el in doc.select(&sel) {
        let href = el.value().attr("href").unwrap_or_default().trim();
        if href.is_empty() || href == "/" || href.starts_with('#') {
            continue;
        }
        if let Some(frag) = &rule.require_path {
            if !href.contains(frag.as_str()) {
                continue;
            }
        }
        let title = normalize_text(&el.text().collect::<Vec<_>>().join(" "));
        if title.chars().count() <= rule.min_title_len {
            continue;
        }
        let Ok(full) = base.join(href) else {
            continue;
        };
        out.push(Article {
            title,
            url: full.to_string(),
            source: source.to_string(),
            published: String::new(),
        });
    }
    Ok(out)
}

pub struct HtmlLinksProvider {
    name: String,
    rule: LinkRule,
    mode: Mode,
}

enum Mode {
    /// (page_url, html) pairs
    Fixture(Vec<(String, String)>),
    Http {
        urls: Vec<String>,
        client: reqwest::Client,
    },
}

impl HtmlLinksProvider {
    pub fn from_urls(
        name: impl Into<String>,
        urls: Vec<String>,
        rule: LinkRule,
        client: reqwest::Client,
    ) -> Self {
        Self {
            name: name.into(),
            rule,
            mode: Mode::Http { urls, client },
        }
    }

    pub fn from_fixtures(name: impl Into<String>, pages: &[(&str, &str)], rule: LinkRule) -> Self {
        Self {
            name: name.into(),
            rule,
            mode: Mode::Fixture(
                pages
                    .iter()
                    .map(|(u, h)| (u.to_string(), h.to_string()))
                    .collect(),
            ),
        }
    }

    async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<String> {
        client
            .get(url)
            .send()
            .await
            .context("page http get()")?
            .error_for_status()
            .context("page http non-2xx")?
            .text()
            .await
            .context("page http .text()")
    }
}

#[async_trait]
impl SourceProvider for HtmlLinksProvider {
    async fn fetch_latest(&self) -> Result<Vec<Article>> {
        let mut out = Vec::new();
        match &self.mode {
            Mode::Fixture(pages) => {
                for (url, html) in pages {
                    out.extend(extract_links(html, url, &self.name, &self.rule)?);
                }
            }
            Mode::Http { urls, client } => {
                for url in urls {
                    // Html is !Send: parse right after the await, never across one.
                    let parsed = match Self::fetch_page(client, url).await {
                        Ok(body) => extract_links(&body, url, &self.name, &self.rule),
                        Err(e) => Err(e),
                    };
                    match parsed {
                        Ok(mut v) => out.append(&mut v),
                        Err(e) => {
                            tracing::warn!(
                                target: "ingest",
                                error = ?e, provider = %self.name, %url,
                                "page skipped"
                            );
                            counter!("digest_provider_errors_total").increment(1);
                        }
                    }
                }
            }
        }
        out.truncate(self.rule.limit);
        Ok(out)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
<a href="/">Accueil de la commune</a>
<a href="/infos/matha-foire-123">La foire de Matha revient ce week-end</a>
<a href="/meteo">Météo</a>
<a href="https://other.test/infos/x">Un article externe assez long pour passer</a>
<a href="/contact">Contactez la mairie d'Aumagne</a>
</body></html>"#;

    #[test]
    fn keeps_long_links_and_resolves_relative() {
        let rule = LinkRule { min_title_len: 15, require_path: None, limit: 10 };
        let v = extract_links(PAGE, "https://www.aumagne.fr/", "Mairie", &rule).unwrap();
        let urls: Vec<_> = v.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://www.aumagne.fr/infos/matha-foire-123",
                "https://other.test/infos/x",
                "https://www.aumagne.fr/contact",
            ]
        );
        assert!(v.iter().all(|a| a.published.is_empty()));
    }

    #[test]
    fn required_path_filters_hrefs() {
        let rule = LinkRule {
            min_title_len: 20,
            require_path: Some("/infos/".into()),
            limit: 15,
        };
        let v = extract_links(PAGE, "https://www.francebleu.fr/x", "France Bleu", &rule).unwrap();
        assert_eq!(v.len(), 2);
        assert_eq!(v[0].title, "La foire de Matha revient ce week-end");
    }

    #[tokio::test]
    async fn limit_applies_across_pages() {
        let rule = LinkRule { min_title_len: 15, require_path: None, limit: 4 };
        let p = HtmlLinksProvider::from_fixtures(
            "Vals de Saintonge",
            &[("https://a.test/", PAGE), ("https://b.test/", PAGE)],
            rule,
        );
        assert_eq!(p.fetch_latest().await.unwrap().len(), 4);
    }
}
