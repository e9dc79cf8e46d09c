//! # Publication dates
//!
//! Feeds and scraped pages hand us whatever date text they like. This module
//! turns it into a UTC instant, or says plainly that it could not.
//!
//! - Strategies are tried in table order; the first success wins.
//! - A missing offset is read as UTC.
//! - Nothing here returns an error: unparseable is a normal outcome, and the
//!   recency check treats it as recent (scraped pages never carry dates).

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use time::{format_description::well_known::Rfc2822, OffsetDateTime};

use crate::ingest::types::Article;

pub const DEFAULT_MAX_AGE_HOURS: i64 = 48;

/// Outcome of parsing a free-form date string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDate {
    At(DateTime<Utc>),
    Unparseable,
}

impl ParsedDate {
    pub fn instant(self) -> Option<DateTime<Utc>> {
        match self {
            ParsedDate::At(t) => Some(t),
            ParsedDate::Unparseable => None,
        }
    }
}

type Strategy = fn(&str) -> Option<DateTime<Utc>>;

/// Tried in this order. Adding a format is one line here.
const STRATEGIES: &[(&str, Strategy)] = &[
    ("rfc2822", parse_rfc2822),
    ("rfc2822_lenient", parse_rfc2822_lenient),
    ("rfc3339", parse_rfc3339),
    ("iso_offset", parse_iso_offset),
    ("iso_naive", parse_iso_naive),
    ("iso_date", parse_iso_date),
];

fn parse_rfc2822(s: &str) -> Option<DateTime<Utc>> {
    let dt = OffsetDateTime::parse(s, &Rfc2822).ok()?;
    DateTime::from_timestamp(dt.unix_timestamp(), dt.nanosecond())
}

/// Single-digit days, odd zone names: chrono is looser than `time` here.
fn parse_rfc2822_lenient(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(s)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

/// `2025-10-06T08:00:00Z`, `2025-10-06T08:00:00.123+02:00`
fn parse_rfc3339(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

/// `2025-10-06T08:00:00+0200`
fn parse_iso_offset(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z")
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

/// `2025-10-06T08:00:00` (no offset → UTC)
fn parse_iso_naive(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|n| Utc.from_utc_datetime(&n))
}

/// `2025-10-06` (midnight UTC)
fn parse_iso_date(s: &str) -> Option<DateTime<Utc>> {
    let d = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&d.and_hms_opt(0, 0, 0)?))
}

/// Parse a free-form publication date.
pub fn parse_published(raw: &str) -> ParsedDate {
    let s = raw.trim();
    if s.is_empty() {
        return ParsedDate::Unparseable;
    }
    for (name, strategy) in STRATEGIES {
        if let Some(t) = strategy(s) {
            tracing::trace!(target: "dates", strategy = *name, "date parsed");
            return ParsedDate::At(t);
        }
    }
    tracing::debug!(target: "dates", raw = s, "unparseable date, assuming recent");
    ParsedDate::Unparseable
}

/// Recency gate over a fixed window.
#[derive(Debug, Clone, Copy)]
pub struct DateClassifier {
    max_age: Duration,
}

impl Default for DateClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_AGE_HOURS)
    }
}

impl DateClassifier {
    /// `max_age_hours` < 1, or too large for a `Duration`, falls back to the
    /// default window.
    pub fn new(max_age_hours: i64) -> Self {
        let max_age = Some(max_age_hours)
            .filter(|h| *h > 0)
            .and_then(Duration::try_hours)
            .unwrap_or_else(|| {
                tracing::warn!(
                    target: "dates",
                    max_age_hours,
                    default = DEFAULT_MAX_AGE_HOURS,
                    "recency window out of range, using default"
                );
                Duration::hours(DEFAULT_MAX_AGE_HOURS)
            });
        Self { max_age }
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Recent iff `now - published < max_age`. Undated or unparseable → recent.
    pub fn is_recent(&self, article: &Article, now: DateTime<Utc>) -> bool {
        match parse_published(&article.published) {
            ParsedDate::Unparseable => true,
            ParsedDate::At(t) => now.signed_duration_since(t) < self.max_age,
        }
    }
}
