//! Mirror registry: ordered artifact mirrors with per-mirror failure counts.
//!
//! Every acquisition walks the mirrors in their current order. Failures are
//! counted per mirror for the lifetime of the process and the list is
//! re-sorted (stable, ascending by failures) after each acquisition, so a
//! mirror that misbehaves once drops behind healthier ones for all later
//! downloads. There is no decay or recovery.

/// Mirrors used when the config does not list any.
pub const DEFAULT_MIRRORS: &[&str] = &[
    "https://official-factorio-mirror.re146.dev",
    "https://mods-storage.re146.dev",
];

/// One configured mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorEntry {
    /// Position in the configured list; stable across reorders.
    pub id: usize,
    pub base_url: String,
    pub failures: u32,
}

/// A concrete artifact URL on a specific mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateUrl {
    pub url: String,
    /// [`MirrorEntry::id`] of the mirror serving this URL.
    pub mirror: usize,
}

#[derive(Debug, Clone)]
pub struct MirrorRegistry {
    entries: Vec<MirrorEntry>,
}

impl MirrorRegistry {
    pub fn new<I, S>(bases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = bases
            .into_iter()
            .enumerate()
            .map(|(id, base)| MirrorEntry {
                id,
                base_url: base.into(),
                failures: 0,
            })
            .collect();
        Self { entries }
    }

    /// Entries in current priority order.
    pub fn entries(&self) -> &[MirrorEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `{base}/{name}/{version}.zip` for every mirror, in current order.
    pub fn candidate_urls(&self, name: &str, version: &str) -> Vec<CandidateUrl> {
        self.entries
            .iter()
            .map(|m| CandidateUrl {
                url: artifact_url(&m.base_url, name, version),
                mirror: m.id,
            })
            .collect()
    }

    /// Count one failure against `mirror`. Returns false for an unknown id.
    pub fn record_failure(&mut self, mirror: usize) -> bool {
        match self.entries.iter_mut().find(|m| m.id == mirror) {
            Some(entry) => {
                entry.failures = entry.failures.saturating_add(1);
                true
            }
            None => false,
        }
    }

    /// Failure count for `mirror`, if known.
    pub fn failures(&self, mirror: usize) -> Option<u32> {
        self.entries
            .iter()
            .find(|m| m.id == mirror)
            .map(|m| m.failures)
    }

    /// Stable sort by ascending failure count.
    pub fn reorder(&mut self) {
        self.entries.sort_by_key(|m| m.failures);
    }
}

impl Default for MirrorRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MIRRORS.iter().copied())
    }
}

/// Build the artifact URL, percent-encoding `name` as a path segment.
fn artifact_url(base: &str, name: &str, version: &str) -> String {
    let base = base.trim_end_matches('/');
    let file = format!("{}.zip", version);
    if let Ok(mut url) = url::Url::parse(base) {
        let pushed = match url.path_segments_mut() {
            Ok(mut segments) => {
                segments.pop_if_empty().push(name).push(&file);
                true
            }
            Err(()) => false,
        };
        if pushed {
            return url.into();
        }
    }
    format!("{}/{}/{}", base, name, file)
}
