//! # Relevance pipeline
//! Pure, synchronous composition over one batch of raw articles:
//! recency → perimeter → dedup → classify → assemble.
//! No I/O; the caller owns the seen-set, the network and the state file.

use chrono::{DateTime, Utc};
use metrics::counter;
use tracing::info;

use crate::classify::{Bucket, Classifier};
use crate::config::DigestConfig;
use crate::dates::DateClassifier;
use crate::dedup::{deduplicate, SeenSet};
use crate::digest::{Classified, Digest, DigestAssembler};
use crate::ingest::types::Article;
use crate::relevance::{Perimeter, RelevanceFilter};

/// Stage-by-stage counts, for logs and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageCounts {
    pub raw: usize,
    pub recent: usize,
    pub relevant: usize,
    pub new: usize,
    pub primary: usize,
    pub surrounding: usize,
    pub topical: usize,
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Rendered digest, `None` when nothing survived.
    pub text: Option<String>,
    /// Urls the caller must merge into the seen-set after a confirmed send.
    pub newly_seen: Vec<String>,
    pub digest: Option<Digest>,
    pub counts: StageCounts,
}

impl PipelineOutput {
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    recency: DateClassifier,
    relevance: RelevanceFilter,
    classifier: Classifier,
    assembler: DigestAssembler,
}

impl Pipeline {
    pub fn new(
        recency: DateClassifier,
        perimeter: Perimeter,
        assembler: DigestAssembler,
    ) -> Self {
        Self {
            recency,
            relevance: RelevanceFilter::new(perimeter.clone()),
            classifier: Classifier::new(perimeter),
            assembler,
        }
    }

    pub fn from_config(cfg: &DigestConfig) -> Self {
        Self::new(
            DateClassifier::new(cfg.recency.max_age_hours),
            Perimeter::from(&cfg.perimeter),
            DigestAssembler::from_cfg(&cfg.digest, &cfg.perimeter.home),
        )
    }

    pub fn assembler(&self) -> &DigestAssembler {
        &self.assembler
    }

    pub fn run(&self, raw: Vec<Article>, seen: &SeenSet, now: DateTime<Utc>) -> PipelineOutput {
        let mut counts = StageCounts {
            raw: raw.len(),
            ..Default::default()
        };

        // 1) Recency
        let recent: Vec<Article> = raw
            .into_iter()
            .filter(|a| self.recency.is_recent(a, now))
            .collect();
        counts.recent = recent.len();

        // 2) Perimeter
        let relevant: Vec<Article> = recent
            .into_iter()
            .filter(|a| self.relevance.is_relevant(a))
            .collect();
        counts.relevant = relevant.len();

        // 3) Dedup against prior runs and within the batch
        let fresh = deduplicate(relevant, seen);
        counts.new = fresh.len();

        // Every new url is remembered, including ones later cut by a bucket cap.
        let fresh_urls: Vec<String> = fresh.iter().map(|a| a.url.clone()).collect();

        // 4) Classify, arrival order kept per bucket
        let mut classified = Classified::new();
        for a in fresh {
            let b = self.classifier.classify(&a);
            classified.entry(b).or_default().push(a);
        }
        let n = |b: Bucket| classified.get(&b).map_or(0, Vec::len);
        counts.primary = n(Bucket::PrimaryLocation);
        counts.surrounding = n(Bucket::SurroundingArea);
        counts.topical = n(Bucket::TopicalActivity);

        info!(
            target: "pipeline",
            raw = counts.raw,
            recent = counts.recent,
            relevant = counts.relevant,
            new = counts.new,
            primary = counts.primary,
            surrounding = counts.surrounding,
            topical = counts.topical,
            "pipeline stages"
        );

        // 5) Assemble
        let Some(digest) = self.assembler.assemble(&classified, now) else {
            return PipelineOutput {
                text: None,
                newly_seen: Vec::new(),
                digest: None,
                counts,
            };
        };

        counter!("digest_articles_kept_total").increment(counts.new as u64);

        PipelineOutput {
            text: Some(self.assembler.render(&digest)),
            newly_seen: fresh_urls,
            digest: Some(digest),
            counts,
        }
    }
}
