// src/digest.rs
//! Digest assembly and Telegram-Markdown rendering.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::classify::Bucket;
use crate::config::digest::DigestCfg;
use crate::ingest::types::Article;

/// Classified articles in arrival order, per bucket.
pub type Classified = BTreeMap<Bucket, Vec<Article>>;

/// Per-bucket item caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketCaps {
    pub primary: usize,
    pub surrounding: usize,
    pub topical: usize,
}

impl Default for BucketCaps {
    fn default() -> Self {
        Self {
            primary: 5,
            surrounding: 8,
            topical: 8,
        }
    }
}

impl BucketCaps {
    pub fn for_bucket(&self, b: Bucket) -> usize {
        match b {
            Bucket::PrimaryLocation => self.primary,
            Bucket::SurroundingArea => self.surrounding,
            Bucket::TopicalActivity => self.topical,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub bucket: Bucket,
    pub articles: Vec<Article>,
}

/// Non-empty, capped, ordered digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub generated_at: DateTime<Utc>,
    pub sections: Vec<Section>,
}

impl Digest {
    pub fn article_count(&self) -> usize {
        self.sections.iter().map(|s| s.articles.len()).sum()
    }

    pub fn articles(&self) -> impl Iterator<Item = &Article> {
        self.sections.iter().flat_map(|s| s.articles.iter())
    }
}

#[derive(Debug, Clone)]
pub struct DigestAssembler {
    label: String,
    home_title: String,
    caps: BucketCaps,
}

impl DigestAssembler {
    /// `home` is the home locality; its upper-cased form heads the first section.
    pub fn new(label: impl Into<String>, home: &str, caps: BucketCaps) -> Self {
        Self {
            label: label.into(),
            home_title: home.trim().to_uppercase(),
            caps,
        }
    }

    pub fn from_cfg(cfg: &DigestCfg, home: &str) -> Self {
        Self::new(
            cfg.label.clone(),
            home,
            BucketCaps {
                primary: cfg.primary_cap,
                surrounding: cfg.surrounding_cap,
                topical: cfg.topical_cap,
            },
        )
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// `None` means empty digest; the caller decides between silence and heartbeat.
    pub fn assemble(&self, classified: &Classified, now: DateTime<Utc>) -> Option<Digest> {
        let sections: Vec<Section> = Bucket::RENDER_ORDER
            .iter()
            .filter_map(|b| {
                let items: Vec<Article> = classified
                    .get(b)
                    .map(|v| v.iter().take(self.caps.for_bucket(*b)).cloned().collect())
                    .unwrap_or_default();
                (!items.is_empty()).then_some(Section {
                    bucket: *b,
                    articles: items,
                })
            })
            .collect();

        if sections.is_empty() {
            None
        } else {
            Some(Digest {
                generated_at: now,
                sections,
            })
        }
    }

    fn section_title(&self, b: Bucket) -> String {
        match b {
            Bucket::PrimaryLocation => format!("\u{1F3D8}\u{FE0F} *{}*", self.home_title),
            Bucket::SurroundingArea => "\u{1F4CD} *ALENTOURS*".to_string(),
            Bucket::TopicalActivity => "\u{1F3AF} *ACTIVITES & LOISIRS*".to_string(),
        }
    }

    pub fn render(&self, digest: &Digest) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "\u{1F4F0} *{}* \u{2014} {}",
            self.label,
            digest.generated_at.format("%d %b %Y")
        );
        out.push('\n');

        for s in &digest.sections {
            let _ = writeln!(out, "{}", self.section_title(s.bucket));
            for a in &s.articles {
                let _ = writeln!(out, "{}", entry_line(a));
            }
            out.push('\n');
        }
        out.trim_end_matches('\n').to_string() + "\n"
    }

    /// Fixed message for a diagnostic run that found nothing.
    pub fn heartbeat(&self, now: DateTime<Utc>) -> String {
        format!(
            "\u{26A0}\u{FE0F} *Test fausse alerte \u{2014} {}*\n\n\
             Aucune nouvelle aujourd'hui, mais le systeme fonctionne.\n\
             \u{2705} Pipeline OK\n\
             \u{1F4C5} {}",
            self.label,
            now.format("%d %b %Y %H:%M UTC")
        )
    }
}

/// Prefix marking a digest sent in diagnostic mode.
pub const TEST_PREFIX: &str = "\u{26A0}\u{FE0F} *TEST* \u{2014} ";

/// `• [title](url) _(source)_`
pub fn entry_line(a: &Article) -> String {
    format!(
        "\u{2022} [{}]({}) _({})_",
        markdown_safe(&a.title),
        a.url,
        markdown_safe(&a.source)
    )
}

/// Legacy Telegram Markdown cannot escape inside an entity, so the
/// entity markers are replaced in free text instead.
fn markdown_safe(s: &str) -> String {
    s.chars()
        .filter_map(|c| match c {
            '*' | '`' => None,
            '_' => Some(' '),
            '[' => Some('('),
            ']' => Some(')'),
            c => Some(c),
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
