// src/relevance.rs
//! Perimeter gate: exclusion list first, then the in-perimeter place names.
//!
//! Matching is plain substring containment over the lower-cased
//! `title + " " + url` buffer. No word boundaries, no stemming.

use tracing::debug;

use crate::config::digest::PerimeterCfg;
use crate::ingest::types::Article;

/// Lower-cased place and keyword lists the filter and classifier match against.
#[derive(Debug, Clone)]
pub struct Perimeter {
    pub home: String,
    pub communes: Vec<String>,
    pub excluded: Vec<String>,
    pub keywords: Vec<String>,
}

impl Perimeter {
    pub fn new(home: &str, communes: &[&str], excluded: &[&str], keywords: &[&str]) -> Self {
        let lower = |v: &[&str]| -> Vec<String> {
            v.iter().map(|s| s.trim().to_lowercase()).collect()
        };
        Self {
            home: home.trim().to_lowercase(),
            communes: lower(communes),
            excluded: lower(excluded),
            keywords: lower(keywords),
        }
    }

    pub fn mentions_home(&self, buffer: &str) -> bool {
        !self.home.is_empty() && buffer.contains(self.home.as_str())
    }

    pub fn first_excluded<'a>(&'a self, buffer: &str) -> Option<&'a str> {
        first_hit(&self.excluded, buffer)
    }

    pub fn first_commune<'a>(&'a self, buffer: &str) -> Option<&'a str> {
        first_hit(&self.communes, buffer)
    }

    pub fn first_keyword<'a>(&'a self, buffer: &str) -> Option<&'a str> {
        first_hit(&self.keywords, buffer)
    }
}

impl From<&PerimeterCfg> for Perimeter {
    fn from(cfg: &PerimeterCfg) -> Self {
        Self {
            home: cfg.home.clone(),
            communes: cfg.communes.clone(),
            excluded: cfg.excluded.clone(),
            keywords: cfg.keywords.clone(),
        }
    }
}

fn first_hit<'a>(needles: &'a [String], buffer: &str) -> Option<&'a str> {
    needles
        .iter()
        .find(|n| !n.is_empty() && buffer.contains(n.as_str()))
        .map(|n| n.as_str())
}

/// Why an article was admitted or rejected (first matching term).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Admitted { commune: String },
    Excluded { place: String },
    OutOfPerimeter,
}

impl Verdict {
    pub fn admitted(&self) -> bool {
        matches!(self, Verdict::Admitted { .. })
    }
}

#[derive(Debug, Clone)]
pub struct RelevanceFilter {
    perimeter: Perimeter,
}

impl RelevanceFilter {
    pub fn new(perimeter: Perimeter) -> Self {
        Self { perimeter }
    }

    pub fn perimeter(&self) -> &Perimeter {
        &self.perimeter
    }

    /// Exclusion dominates: a headline naming both an excluded city and a
    /// commune is rejected.
    pub fn evaluate(&self, article: &Article) -> Verdict {
        let buf = article.match_buffer();
        if let Some(place) = self.perimeter.first_excluded(&buf) {
            debug!(target: "relevance", url = %article.url, place, "excluded");
            return Verdict::Excluded {
                place: place.to_string(),
            };
        }
        match self.perimeter.first_commune(&buf) {
            Some(c) => Verdict::Admitted {
                commune: c.to_string(),
            },
            None => Verdict::OutOfPerimeter,
        }
    }

    pub fn is_relevant(&self, article: &Article) -> bool {
        self.evaluate(article).admitted()
    }
}
