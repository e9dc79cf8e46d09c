//! Cross-run memory of delivered urls, and the deduplication pass over it.
//!
//! `SeenSet` is insertion-ordered, capped, and answers membership in O(1).
//! Once the cap is exceeded the oldest entries are dropped first.

use std::collections::{HashSet, VecDeque};

use crate::ingest::types::Article;

pub const DEFAULT_MAX_SEEN: usize = 500;

#[derive(Debug, Clone)]
pub struct SeenSet {
    order: VecDeque<String>,
    index: HashSet<String>,
    cap: usize,
}

impl Default for SeenSet {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_SEEN)
    }
}

impl SeenSet {
    /// `cap` of 0 is treated as 1.
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            order: VecDeque::with_capacity(cap.min(10_000)),
            index: HashSet::with_capacity(cap.min(10_000)),
            cap,
        }
    }

    /// Rebuild from a persisted list (oldest first). Repeats and blanks are
    /// skipped; only the newest `cap` survive.
    pub fn from_persisted<I, S>(urls: I, cap: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::with_capacity(cap);
        set.extend(urls);
        set
    }

    pub fn contains(&self, url: &str) -> bool {
        self.index.contains(url)
    }

    /// Returns false if the url was blank or already present (no reordering).
    pub fn insert(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if url.is_empty() || self.index.contains(&url) {
            return false;
        }
        self.index.insert(url.clone());
        self.order.push_back(url);
        while self.order.len() > self.cap {
            if let Some(old) = self.order.pop_front() {
                self.index.remove(&old);
            }
        }
        true
    }

    pub fn extend<I, S>(&mut self, urls: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for u in urls {
            self.insert(u);
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Oldest first, the order the state file stores.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.order.iter().cloned().collect()
    }
}

/// Keep articles whose url is non-empty and neither in `seen` nor earlier in
/// `candidates`. Relative order is preserved. Url-less articles are dropped:
/// they could never be remembered. `seen` is not modified.
pub fn deduplicate(candidates: Vec<Article>, seen: &SeenSet) -> Vec<Article> {
    let mut batch: HashSet<String> = HashSet::with_capacity(candidates.len());
    let mut keep = Vec::with_capacity(candidates.len());
    for a in candidates {
        if a.url.is_empty() || seen.contains(&a.url) || !batch.insert(a.url.clone()) {
            continue;
        }
        keep.push(a);
    }
    keep
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_evicts_oldest_past_cap() {
        let mut s = SeenSet::with_capacity(3);
        for u in ["a", "b", "c", "d", "e"] {
            s.insert(u);
        }
        assert_eq!(s.to_vec(), vec!["c", "d", "e"]);
        assert!(!s.contains("a"));
        assert!(s.contains("e"));
    }

    #[test]
    fn reinsert_does_not_refresh_position() {
        let mut s = SeenSet::with_capacity(2);
        s.insert("a");
        s.insert("b");
        assert!(!s.insert("a"));
        s.insert("c");
        assert_eq!(s.to_vec(), vec!["b", "c"]);
    }

    #[test]
    fn blanks_are_never_stored() {
        let mut s = SeenSet::default();
        assert!(!s.insert(""));
        assert!(s.is_empty());
    }

    #[test]
    fn from_persisted_keeps_newest() {
        let s = SeenSet::from_persisted(vec!["a", "b", "a", "c"], 2);
        assert_eq!(s.to_vec(), vec!["b", "c"]);
    }

    #[test]
    fn dedup_drops_seen_and_in_batch_repeats() {
        let seen = SeenSet::from_persisted(vec!["old"], 10);
        let v = vec![
            Article::new("1", "old", "X", ""),
            Article::new("2", "u4", "X", ""),
            Article::new("3", "", "X", ""),
            Article::new("4", "u4", "Y", ""),
            Article::new("5", "", "X", ""),
        ];
        let titles: Vec<_> = deduplicate(v, &seen)
            .into_iter()
            .map(|a| a.title)
            .collect();
        assert_eq!(titles, vec!["2"]);
    }

    #[test]
    fn second_pass_over_recorded_batch_is_empty() {
        let batch = vec![
            Article::new("Brocante à Matha", "", "Mairie", ""),
            Article::new("Foire de Matha", "u1", "X", ""),
        ];
        let mut seen = SeenSet::default();
        let first = deduplicate(batch.clone(), &seen);
        assert_eq!(first.len(), 1);
        seen.extend(first.iter().map(|a| a.url.as_str()));
        assert!(deduplicate(batch, &seen).is_empty());
    }
}
