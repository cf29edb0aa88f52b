//! Persistent map from local file path to SHA-1, stored as pretty JSON.
//!
//! Entries are never invalidated by mtime or size: once a path is cached its
//! hash is returned without rereading the file. Code that needs a fresh
//! digest (artifact verification) calls [`super::sha1_path`] directly.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::storage;

/// File name of the checksum index inside the cache directory.
pub const CHECKSUM_FILE: &str = "checksums.json";

/// Write-through checksum store. Every mutation rewrites the whole file.
#[derive(Debug)]
pub struct ChecksumCache {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl ChecksumCache {
    /// Load the store at `path`. A missing or unreadable file yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<BTreeMap<String, String>>(&bytes) {
                Ok(map) => map,
                Err(e) => {
                    tracing::warn!(path = %path.display(), "ignoring corrupt checksum index: {}", e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), "could not read checksum index: {}", e);
                BTreeMap::new()
            }
        };
        Self { path, entries }
    }

    /// Location of the persisted index.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hash for `file`: cached value if present, otherwise computed and persisted.
    pub fn get_hash(&mut self, file: &Path) -> Result<String> {
        let key = cache_key(file)?;
        if let Some(hash) = self.entries.get(&key) {
            return Ok(hash.clone());
        }
        let hash = super::sha1_path(file)?;
        self.entries.insert(key, hash.clone());
        self.save()?;
        Ok(hash)
    }

    /// Cached hash without touching the file.
    pub fn cached(&self, file: &Path) -> Option<&str> {
        let key = cache_key(file).ok()?;
        self.entries.get(&key).map(String::as_str)
    }

    /// Store a known-good hash for `file` and persist.
    pub fn record(&mut self, file: &Path, hash: &str) -> Result<()> {
        let key = cache_key(file)?;
        if self.entries.get(&key).map(String::as_str) == Some(hash) {
            return Ok(());
        }
        self.entries.insert(key, hash.to_string());
        self.save()
    }

    /// Drop the entry for `file`. Returns whether one existed.
    pub fn forget(&mut self, file: &Path) -> Result<bool> {
        let key = cache_key(file)?;
        if self.entries.remove(&key).is_some() {
            self.save()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Forget every entry in memory. The on-disk file is left to the caller
    /// (used after the cache directory itself has been wiped).
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rewrite the index file.
    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.entries).context("serialize checksum index")?;
        storage::write_atomic(&self.path, json.as_bytes())
            .with_context(|| format!("write checksum index: {}", self.path.display()))
    }
}

/// Absolute path string used as the map key.
fn cache_key(file: &Path) -> Result<String> {
    let abs = if file.is_absolute() {
        file.to_path_buf()
    } else {
        std::env::current_dir()
            .context("resolve current dir")?
            .join(file)
    };
    Ok(abs.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::sha1_bytes;

    #[test]
    fn miss_computes_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("a_1.0.0.zip");
        std::fs::write(&artifact, b"zip bytes").unwrap();
        let index = dir.path().join(CHECKSUM_FILE);

        let mut cache = ChecksumCache::open(&index);
        assert!(cache.is_empty());
        let hash = cache.get_hash(&artifact).unwrap();
        assert_eq!(hash, sha1_bytes(b"zip bytes"));
        assert!(index.exists());

        let reopened = ChecksumCache::open(&index);
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.cached(&artifact), Some(hash.as_str()));
    }

    #[test]
    fn hit_does_not_reread_file() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("b.zip");
        std::fs::write(&artifact, b"original").unwrap();
        let mut cache = ChecksumCache::open(dir.path().join(CHECKSUM_FILE));
        let first = cache.get_hash(&artifact).unwrap();

        // Replacing the file at the same path keeps the stale value.
        std::fs::write(&artifact, b"replaced").unwrap();
        assert_eq!(cache.get_hash(&artifact).unwrap(), first);

        // Removing it entirely still answers from the store.
        std::fs::remove_file(&artifact).unwrap();
        assert_eq!(cache.get_hash(&artifact).unwrap(), first);
    }

    #[test]
    fn index_is_pretty_json_object() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("c.zip");
        let index = dir.path().join(CHECKSUM_FILE);
        let mut cache = ChecksumCache::open(&index);
        cache.record(&artifact, "deadbeef").unwrap();

        let text = std::fs::read_to_string(&index).unwrap();
        assert!(text.contains('\n'), "expected pretty-printed output");
        let parsed: BTreeMap<String, String> = serde_json::from_str(&text).unwrap();
        assert_eq!(
            parsed.get(artifact.to_string_lossy().as_ref()).map(String::as_str),
            Some("deadbeef")
        );
    }

    #[test]
    fn corrupt_index_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let index = dir.path().join(CHECKSUM_FILE);
        std::fs::write(&index, b"{not json").unwrap();
        let cache = ChecksumCache::open(&index);
        assert!(cache.is_empty());
    }

    #[test]
    fn forget_removes_entry() {
        let dir = tempfile::tempdir().unwrap();
        let index = dir.path().join(CHECKSUM_FILE);
        let artifact = dir.path().join("d.zip");
        let mut cache = ChecksumCache::open(&index);
        cache.record(&artifact, "abc").unwrap();
        assert!(cache.forget(&artifact).unwrap());
        assert!(!cache.forget(&artifact).unwrap());
        assert!(ChecksumCache::open(&index).is_empty());
    }
}
