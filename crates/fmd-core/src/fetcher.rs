//! Artifact fetcher: cache short-circuit, then mirrors in priority order.
//!
//! For one release:
//! 1. If `cache_dir/<file_name>` exists and a fresh SHA-1 of it matches the
//!    published hash, it is returned without any network I/O.
//! 2. Otherwise each mirror URL is tried in turn. The body is streamed to a
//!    `.part` file, hashed, and renamed onto the final path only on a match.
//!    Transport failures and hash mismatches both count one failure against
//!    the mirror and advance to the next one.
//! 3. After the attempt, success or not, the mirror registry is re-sorted.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::checksum::{self, digests_match, ChecksumCache};
use crate::control::CancelToken;
use crate::error::FetchError;
use crate::mirrors::{MirrorEntry, MirrorRegistry};
use crate::portal::Release;
use crate::storage::{self, PartFile};
use crate::transfer::{TransferError, Transport};

/// Where a fetched artifact came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactSource {
    /// Already present in the cache directory with a matching hash.
    Cache,
    /// Downloaded from this URL.
    Mirror(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedArtifact {
    pub path: PathBuf,
    pub source: ArtifactSource,
}

pub struct ArtifactFetcher {
    transport: Arc<dyn Transport>,
    mirrors: Arc<Mutex<MirrorRegistry>>,
    checksums: Arc<Mutex<ChecksumCache>>,
    cache_dir: PathBuf,
}

impl ArtifactFetcher {
    pub fn new(
        transport: Arc<dyn Transport>,
        mirrors: Arc<Mutex<MirrorRegistry>>,
        checksums: Arc<Mutex<ChecksumCache>>,
        cache_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            transport,
            mirrors,
            checksums,
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Shared checksum store (also used by install).
    pub fn checksums(&self) -> &Arc<Mutex<ChecksumCache>> {
        &self.checksums
    }

    /// Copy of the mirror list in current priority order.
    pub fn mirror_snapshot(&self) -> Vec<MirrorEntry> {
        self.lock_mirrors().entries().to_vec()
    }

    fn lock_mirrors(&self) -> MutexGuard<'_, MirrorRegistry> {
        self.mirrors.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_checksums(&self) -> MutexGuard<'_, ChecksumCache> {
        self.checksums.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Local path for `release` inside the cache directory.
    pub fn artifact_path(&self, release: &Release) -> Result<PathBuf, FetchError> {
        let name = release.file_name.as_str();
        let plain = !name.is_empty()
            && !name.contains(['/', '\\'])
            && Path::new(name).file_name().map(|f| f == name).unwrap_or(false);
        if !plain {
            return Err(FetchError::UnsafeFileName(name.to_string()));
        }
        Ok(self.cache_dir.join(name))
    }

    /// Produce the local artifact for `release` of mod `name`.
    pub fn fetch(
        &self,
        name: &str,
        release: &Release,
        cancel: &CancelToken,
    ) -> Result<FetchedArtifact, FetchError> {
        let final_path = self.artifact_path(release)?;
        if let Some(hit) = self.cached_artifact(&final_path, release)? {
            tracing::debug!(mod_name = name, file = %release.file_name, "using cached artifact");
            return Ok(hit);
        }
        let result = self.fetch_from_mirrors(name, release, &final_path, cancel);
        self.lock_mirrors().reorder();
        result
    }

    fn cached_artifact(
        &self,
        path: &Path,
        release: &Release,
    ) -> Result<Option<FetchedArtifact>, FetchError> {
        if !path.is_file() {
            return Ok(None);
        }
        let actual = checksum::sha1_path(path).map_err(FetchError::Local)?;
        if !digests_match(&actual, &release.sha1) {
            tracing::debug!(path = %path.display(), "cached artifact does not match published hash");
            return Ok(None);
        }
        self.lock_checksums()
            .record(path, &actual)
            .map_err(FetchError::Local)?;
        Ok(Some(FetchedArtifact {
            path: path.to_path_buf(),
            source: ArtifactSource::Cache,
        }))
    }

    fn fetch_from_mirrors(
        &self,
        name: &str,
        release: &Release,
        final_path: &Path,
        cancel: &CancelToken,
    ) -> Result<FetchedArtifact, FetchError> {
        let candidates = self.lock_mirrors().candidate_urls(name, &release.version);
        if candidates.is_empty() {
            return Err(FetchError::NoMirrors);
        }
        std::fs::create_dir_all(&self.cache_dir)
            .map_err(|e| FetchError::Local(anyhow::Error::new(e).context("create cache dir")))?;

        let attempts = candidates.len();
        let mut last: Option<FetchError> = None;
        for candidate in candidates {
            if cancel.is_cancelled() {
                return Err(FetchError::Interrupted);
            }
            match self.try_mirror(&candidate.url, final_path, release, cancel) {
                Ok(hash) => {
                    self.lock_checksums()
                        .record(final_path, &hash)
                        .map_err(FetchError::Local)?;
                    tracing::info!(mod_name = name, version = %release.version, url = %candidate.url, "artifact fetched");
                    return Ok(FetchedArtifact {
                        path: final_path.to_path_buf(),
                        source: ArtifactSource::Mirror(candidate.url),
                    });
                }
                Err(FetchError::Interrupted) => return Err(FetchError::Interrupted),
                Err(FetchError::Local(e)) => return Err(FetchError::Local(e)),
                Err(e) => {
                    tracing::warn!(url = %candidate.url, "mirror attempt failed: {}", e);
                    self.lock_mirrors().record_failure(candidate.mirror);
                    last = Some(e);
                }
            }
        }
        Err(FetchError::Exhausted {
            attempts,
            last: Box::new(last.unwrap_or(FetchError::NoMirrors)),
        })
    }

    /// Download `url` to the temp path, verify, rename. Returns the verified hash.
    fn try_mirror(
        &self,
        url: &str,
        final_path: &Path,
        release: &Release,
        cancel: &CancelToken,
    ) -> Result<String, FetchError> {
        let temp = storage::temp_path(final_path);
        let mut part = PartFile::create(&temp).map_err(FetchError::Local)?;

        if let Err(e) = self.transport.download(url, &mut part, cancel) {
            discard_quietly(part);
            return Err(match e {
                TransferError::Interrupted => FetchError::Interrupted,
                TransferError::Io(io) => FetchError::Local(io.into()),
                other => FetchError::Transfer(other),
            });
        }
        if let Err(e) = part.sync() {
            discard_quietly(part);
            return Err(FetchError::Local(e));
        }

        let actual = match checksum::sha1_path(&temp) {
            Ok(h) => h,
            Err(e) => {
                discard_quietly(part);
                return Err(FetchError::Local(e));
            }
        };
        if !digests_match(&actual, &release.sha1) {
            discard_quietly(part);
            return Err(FetchError::HashMismatch {
                expected: release.sha1.clone(),
                actual,
            });
        }
        part.finalize(final_path).map_err(FetchError::Local)?;
        Ok(actual)
    }
}

fn discard_quietly(part: PartFile) {
    let temp = part.temp_path().to_path_buf();
    if let Err(e) = part.discard() {
        tracing::warn!(path = %temp.display(), "could not remove temp file: {:#}", e);
    }
}
