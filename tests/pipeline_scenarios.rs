// tests/pipeline_scenarios.rs
// End-to-end runs of the pure pipeline against the shipped perimeter seed.

use chrono::{DateTime, Duration, TimeZone, Utc};
use local_news_digest::config::DigestConfig;
use local_news_digest::{Article, Bucket, Pipeline, SeenSet};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 6, 9, 0, 0).unwrap()
}

fn pipeline() -> Pipeline {
    Pipeline::from_config(&DigestConfig::default_seed().expect("seed config"))
}

fn hours_ago(h: i64) -> String {
    (now() - Duration::hours(h))
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

fn bucket_of(out: &local_news_digest::PipelineOutput, url: &str) -> Option<Bucket> {
    out.digest.as_ref().and_then(|d| {
        d.sections
            .iter()
            .find(|s| s.articles.iter().any(|a| a.url == url))
            .map(|s| s.bucket)
    })
}

#[test]
fn fresh_fair_in_matha_is_topical() {
    let raw = vec![Article::new("Foire de Matha", "u1", "X", hours_ago(2))];
    let out = pipeline().run(raw, &SeenSet::default(), now());

    assert_eq!(out.newly_seen, vec!["u1".to_string()]);
    assert_eq!(bucket_of(&out, "u1"), Some(Bucket::TopicalActivity));
    let text = out.text.expect("digest text");
    assert!(text.contains("\u{2022} [Foire de Matha](u1) _(X)_"));
    assert!(text.contains("*ACTIVITES & LOISIRS*"));
    assert!(text.contains("06 Oct 2025"));
}

#[test]
fn stale_article_yields_nothing() {
    let raw = vec![Article::new("Foire de Matha", "u1", "X", hours_ago(72))];
    let out = pipeline().run(raw, &SeenSet::default(), now());
    assert!(out.text.is_none());
    assert!(out.newly_seen.is_empty());
    assert_eq!(out.counts.recent, 0);
}

#[test]
fn home_locality_beats_keyword() {
    let raw = vec![Article::new("Aumagne fête locale", "u2", "X", "")];
    let out = pipeline().run(raw, &SeenSet::default(), now());
    assert_eq!(bucket_of(&out, "u2"), Some(Bucket::PrimaryLocation));
    assert!(out.text.unwrap().contains("*AUMAGNE*"));
}

#[test]
fn excluded_city_rejects_despite_commune() {
    let raw = vec![Article::new("Poitiers et Matha en fête", "u3", "X", "")];
    let out = pipeline().run(raw, &SeenSet::default(), now());
    assert!(out.text.is_none());
    assert_eq!(out.counts.relevant, 0);
}

#[test]
fn repeated_url_in_batch_keeps_first() {
    let raw = vec![
        Article::new("Matha : conseil municipal", "u4", "SudOuest", ""),
        Article::new("Matha : le conseil a voté", "u4", "Google News", ""),
    ];
    let out = pipeline().run(raw, &SeenSet::default(), now());
    assert_eq!(out.newly_seen, vec!["u4".to_string()]);
    let d = out.digest.unwrap();
    let all: Vec<_> = d.articles().collect();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].source, "SudOuest");
}

#[test]
fn undated_articles_survive_any_clock() {
    let raw = vec![Article::new("Marché de Matha", "u5", "Mairie", "hier")];
    let far = Utc.with_ymd_and_hms(2099, 1, 1, 0, 0, 0).unwrap();
    let out = pipeline().run(raw, &SeenSet::default(), far);
    assert_eq!(out.counts.recent, 1);
    assert!(out.text.is_some());
}

#[test]
fn already_seen_urls_are_dropped() {
    let seen = SeenSet::from_persisted(vec!["u1"], 500);
    let raw = vec![Article::new("Foire de Matha", "u1", "X", "")];
    let out = pipeline().run(raw, &seen, now());
    assert!(out.text.is_none());
    assert!(out.newly_seen.is_empty());
}

#[test]
fn url_less_articles_yield_nothing() {
    let raw = vec![
        Article::new("Brocante à Matha dimanche", "", "Mairie", ""),
        Article::new("Conseil municipal d'Aumagne", "", "Mairie", ""),
    ];
    let out = pipeline().run(raw, &SeenSet::default(), now());
    assert!(out.text.is_none());
    assert!(out.newly_seen.is_empty());
    assert_eq!(out.counts.relevant, 2);
    assert_eq!(out.counts.new, 0);
}

#[test]
fn rerun_after_recording_is_empty_even_with_url_less_entries() {
    let raw = vec![
        Article::new("Brocante à Matha", "", "Mairie", ""),
        Article::new("Foire de Matha", "https://x.test/foire", "X", ""),
    ];
    let p = pipeline();
    let first = p.run(raw.clone(), &SeenSet::default(), now());
    assert_eq!(first.newly_seen, vec!["https://x.test/foire"]);

    let mut seen = SeenSet::default();
    seen.extend(first.newly_seen.iter().map(String::as_str));
    let second = p.run(raw, &seen, now());
    assert!(second.text.is_none());
    assert!(second.newly_seen.is_empty());
}

#[test]
fn capped_articles_are_still_recorded() {
    let raw: Vec<Article> = (0..7)
        .map(|i| Article::new(format!("Aumagne n°{i}"), format!("https://x.test/{i}"), "X", ""))
        .collect();
    let out = pipeline().run(raw, &SeenSet::default(), now());
    assert_eq!(out.digest.as_ref().unwrap().article_count(), 5);
    assert_eq!(out.newly_seen.len(), 7);
    assert_eq!(out.newly_seen[0], "https://x.test/0");
}
