// src/classify.rs
//! Bucket assignment for admitted articles.
//!
//! Precedence lives in one table: home locality, then topic keyword, then
//! the catch-all surrounding-area bucket.

use serde::{Deserialize, Serialize};

use crate::ingest::types::Article;
use crate::relevance::Perimeter;

/// Output category. Declaration order is the render order of the digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Bucket {
    PrimaryLocation,
    SurroundingArea,
    TopicalActivity,
}

impl Bucket {
    pub const RENDER_ORDER: [Bucket; 3] = [
        Bucket::PrimaryLocation,
        Bucket::SurroundingArea,
        Bucket::TopicalActivity,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Bucket::PrimaryLocation => "primary-location",
            Bucket::SurroundingArea => "surrounding-area",
            Bucket::TopicalActivity => "topical-activity",
        }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

type Rule = fn(&Perimeter, &str) -> bool;

fn mentions_home(p: &Perimeter, buf: &str) -> bool {
    p.mentions_home(buf)
}

fn mentions_keyword(p: &Perimeter, buf: &str) -> bool {
    p.first_keyword(buf).is_some()
}

fn always(_: &Perimeter, _: &str) -> bool {
    true
}

/// First rule that holds decides the bucket.
pub const PRECEDENCE: &[(Bucket, Rule)] = &[
    (Bucket::PrimaryLocation, mentions_home),
    (Bucket::TopicalActivity, mentions_keyword),
    (Bucket::SurroundingArea, always),
];

#[derive(Debug, Clone)]
pub struct Classifier {
    perimeter: Perimeter,
}

impl Classifier {
    pub fn new(perimeter: Perimeter) -> Self {
        Self { perimeter }
    }

    /// Expects an article already admitted by the relevance filter.
    pub fn classify(&self, article: &Article) -> Bucket {
        let buf = article.match_buffer();
        PRECEDENCE
            .iter()
            .find(|(_, rule)| rule(&self.perimeter, &buf))
            .map(|(bucket, _)| *bucket)
            .unwrap_or(Bucket::SurroundingArea)
    }
}
