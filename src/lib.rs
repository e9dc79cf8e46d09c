// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod classify;
pub mod config;
pub mod dates;
pub mod dedup;
pub mod digest;
pub mod ingest;
pub mod job;
pub mod notify;
pub mod pipeline;
pub mod relevance;
pub mod state;

// ---- Re-exports for stable public API ----
pub use crate::classify::{Bucket, Classifier};
pub use crate::dates::{parse_published, DateClassifier, ParsedDate};
pub use crate::dedup::{deduplicate, SeenSet};
pub use crate::digest::{Digest, DigestAssembler};
pub use crate::ingest::types::{Article, SourceProvider};
pub use crate::job::{run_job, JobOutcome};
pub use crate::pipeline::{Pipeline, PipelineOutput};
pub use crate::relevance::{Perimeter, RelevanceFilter};
