//! Error taxonomy for lookup, fetch and resolution.
//!
//! [`ResolveError`] is contained by the resolver: it is logged, recorded in
//! the run report, and the affected package ends up absent in the visited
//! set. Only a [`ResolveAbort`] (cancellation or a local disk fault) escapes
//! a resolve call.

use crate::transfer::TransferError;

/// Registry metadata lookup failed.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// The portal answered with an error object; this is its `message`.
    #[error("{0}")]
    Portal(String),
    /// Request failed at the transport level (timeout, non-2xx, ...).
    #[error(transparent)]
    Transport(#[from] TransferError),
    /// Body was not the expected JSON shape.
    #[error("malformed metadata: {0}")]
    Decode(serde_json::Error),
}

impl From<serde_json::Error> for LookupError {
    fn from(e: serde_json::Error) -> Self {
        LookupError::Decode(e)
    }
}

impl LookupError {
    pub fn is_interrupted(&self) -> bool {
        matches!(self, LookupError::Transport(TransferError::Interrupted))
    }
}

/// Acquiring a release artifact failed.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("no mirrors configured")]
    NoMirrors,
    /// Release file name is not a plain file name (contains separators, `..`, ...).
    #[error("unsafe artifact file name: {0:?}")]
    UnsafeFileName(String),
    /// Downloaded bytes do not match the published SHA-1.
    #[error("hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },
    #[error(transparent)]
    Transfer(#[from] TransferError),
    /// Every candidate mirror failed; carries the last failure.
    #[error("all {attempts} mirror(s) failed; last error: {last}")]
    Exhausted {
        attempts: usize,
        last: Box<FetchError>,
    },
    /// Local disk fault (create, hash, rename). Not charged to any mirror.
    #[error("local storage: {0:#}")]
    Local(anyhow::Error),
    #[error("download interrupted")]
    Interrupted,
}

/// Why a single node of the dependency walk contributed nothing.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("lookup failed: {0}")]
    Lookup(LookupError),
    #[error("no release of {name} matches {filter}")]
    NoMatchingRelease { name: String, filter: String },
    #[error("version {version} of {name} not found")]
    VersionNotFound { name: String, version: String },
    #[error("fetch failed: {0}")]
    Fetch(FetchError),
}

impl From<LookupError> for ResolveError {
    fn from(e: LookupError) -> Self {
        ResolveError::Lookup(e)
    }
}

impl From<FetchError> for ResolveError {
    fn from(e: FetchError) -> Self {
        ResolveError::Fetch(e)
    }
}

/// Reasons a whole resolve cycle stops early.
#[derive(Debug, thiserror::Error)]
pub enum ResolveAbort {
    /// The caller cancelled the cycle.
    #[error("interrupted by user")]
    Interrupted,
    /// Local disk fault (disk full, permission denied, ...).
    #[error("local storage failure: {0:#}")]
    Storage(anyhow::Error),
}

impl ResolveAbort {
    pub fn is_interrupted(&self) -> bool {
        matches!(self, ResolveAbort::Interrupted)
    }
}
