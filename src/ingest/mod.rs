// src/ingest/mod.rs
pub mod config;
pub mod providers;
pub mod types;

use crate::ingest::types::{Article, SourceProvider};
use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up once a recorder is installed).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "digest_articles_raw_total",
            "Total articles returned by providers."
        );
        describe_counter!(
            "digest_articles_kept_total",
            "Articles that reached a delivered or pending digest."
        );
        describe_counter!(
            "digest_provider_errors_total",
            "Provider fetch/parse errors."
        );
        describe_histogram!("digest_parse_ms", "Provider parse time in milliseconds.");
    });
}

/// Normalize text: decode entities, strip tags, collapse whitespace, trim.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Normalize “ ” ‘ ’ to ASCII quotes (keep « » as-is, French titles use them)
    out = out
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

/// Run every provider once, in order. A failing provider contributes nothing
/// and is logged; the run never aborts here.
pub async fn fetch_all(providers: &[Box<dyn SourceProvider>]) -> Vec<Article> {
    ensure_metrics_described();

    let mut raw = Vec::new();
    for p in providers {
        tracing::info!(target: "ingest", provider = p.name(), "fetching");
        match p.fetch_latest().await {
            Ok(mut v) => {
                tracing::info!(target: "ingest", provider = p.name(), count = v.len(), "fetched");
                raw.append(&mut v);
            }
            Err(e) => {
                tracing::warn!(target: "ingest", error = ?e, provider = p.name(), "provider error");
                counter!("digest_provider_errors_total").increment(1);
            }
        }
    }

    counter!("digest_articles_raw_total").increment(raw.len() as u64);
    tracing::info!(target: "ingest", total = raw.len(), "raw articles");
    raw
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_text_strips_tags_and_entities() {
        let s = "  <b>Foire&nbsp;de</b>   Matha &amp; Aumagne ";
        assert_eq!(normalize_text(s), "Foire de Matha & Aumagne");
    }

    #[test]
    fn normalize_text_keeps_accents_and_apostrophes() {
        let s = "Saint-Jean-d\u{2019}Angély : fête";
        assert_eq!(normalize_text(s), "Saint-Jean-d'Angély : fête");
    }
}
