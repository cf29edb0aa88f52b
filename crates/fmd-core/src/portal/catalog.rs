//! In-process snapshot of the full mod list and fuzzy name search.
//!
//! The snapshot is fetched at most once per process (unless invalidated).
//! Callers that arrive while the first fetch is in flight block on the same
//! lock and get its result, which is how the background warm-up at startup
//! is shared with the first real lookup.

use std::sync::{Arc, Mutex};

use super::types::ModInfo;
use crate::error::LookupError;

#[derive(Debug, Default)]
pub struct Catalog {
    snapshot: Mutex<Option<Arc<Vec<ModInfo>>>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the snapshot, running `fetch` only if none is cached.
    /// A failed fetch is not memoized.
    pub fn get_or_fetch<F>(&self, fetch: F) -> Result<Arc<Vec<ModInfo>>, LookupError>
    where
        F: FnOnce() -> Result<Vec<ModInfo>, LookupError>,
    {
        let mut guard = self.snapshot.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(mods) = guard.as_ref() {
            return Ok(Arc::clone(mods));
        }
        let mods = Arc::new(fetch()?);
        tracing::debug!(count = mods.len(), "catalog snapshot loaded");
        *guard = Some(Arc::clone(&mods));
        Ok(mods)
    }

    /// Snapshot if already loaded; never fetches.
    pub fn cached(&self) -> Option<Arc<Vec<ModInfo>>> {
        self.snapshot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(Arc::clone)
    }

    /// Drop the snapshot so the next access refetches.
    pub fn invalidate(&self) {
        *self.snapshot.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

/// One search result.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub name: String,
    pub title: Option<String>,
    /// Similarity in `[0, 1]`.
    pub score: f64,
}

/// Best `limit` matches of `query` against lowercased mod names, best first.
pub fn search(mods: &[ModInfo], query: &str, limit: usize) -> Vec<SearchHit> {
    let mut hits: Vec<SearchHit> = mods
        .iter()
        .map(|m| SearchHit {
            name: m.name.clone(),
            title: m.title.clone(),
            score: similarity(query, &m.name.to_lowercase()),
        })
        .collect();
    hits.sort_by(|a, b| b.score.total_cmp(&a.score));
    hits.truncate(limit);
    hits
}

/// Ratcliff/Obershelp similarity: `2 * matched / (len(a) + len(b))`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (i, j, k) = longest_match(a, b);
    if k == 0 {
        return 0;
    }
    k + matching_chars(&a[..i], &b[..j]) + matching_chars(&a[i + k..], &b[j + k..])
}

/// Longest common contiguous block as `(start_a, start_b, len)`; earliest wins ties.
fn longest_match(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];
    for i in 0..a.len() {
        let mut cur = vec![0usize; b.len() + 1];
        for j in 0..b.len() {
            if a[i] == b[j] {
                let k = prev[j] + 1;
                cur[j + 1] = k;
                if k > best.2 {
                    best = (i + 1 - k, j + 1 - k, k);
                }
            }
        }
        prev = cur;
    }
    best
}
