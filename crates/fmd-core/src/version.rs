//! Mod version numbers.
//!
//! The portal publishes `major.minor.patch`, but dependency declarations
//! routinely use shorter forms such as `base >= 1.1`. Versions are therefore
//! modelled as any number of dotted numeric components, compared
//! component-wise with missing trailing components treated as zero
//! (`1.1 == 1.1.0`).

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Error returned when a string is not a dotted numeric version.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version: {0:?}")]
pub struct VersionParseError(pub String);

/// A parsed mod version (e.g. `1.2.3`).
#[derive(Debug, Clone)]
pub struct ModVersion {
    parts: Vec<u64>,
}

impl ModVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            parts: vec![major, minor, patch],
        }
    }

    /// Parse `1`, `1.1`, `1.2.3`, optionally prefixed with `v`.
    pub fn parse(s: &str) -> Result<Self, VersionParseError> {
        let trimmed = s.trim();
        let body = trimmed.strip_prefix('v').unwrap_or(trimmed);
        if body.is_empty() {
            return Err(VersionParseError(s.to_string()));
        }
        let mut parts = Vec::new();
        for piece in body.split('.') {
            if piece.is_empty() || !piece.bytes().all(|b| b.is_ascii_digit()) {
                return Err(VersionParseError(s.to_string()));
            }
            let n = piece
                .parse::<u64>()
                .map_err(|_| VersionParseError(s.to_string()))?;
            parts.push(n);
        }
        Ok(Self { parts })
    }

    /// Numeric components as written.
    pub fn parts(&self) -> &[u64] {
        &self.parts
    }
}

impl FromStr for ModVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModVersion::parse(s)
    }
}

impl Ord for ModVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.parts.len().max(other.parts.len());
        for i in 0..len {
            let a = self.parts.get(i).copied().unwrap_or(0);
            let b = other.parts.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for ModVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ModVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ModVersion {}

impl fmt::Display for ModVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for part in &self.parts {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{}", part)?;
            first = false;
        }
        Ok(())
    }
}
