//! SHA-1 content hashing and the persistent path → hash cache.
//!
//! The mod portal publishes a SHA-1 for every release file; that value is the
//! integrity reference for everything downloaded into the cache directory.

mod cache;

use anyhow::{Context, Result};
use sha1::{Digest, Sha1};
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub use cache::{ChecksumCache, CHECKSUM_FILE};

const BUF_SIZE: usize = 64 * 1024;

/// Compute SHA-1 of a file and return the digest as lowercase hex.
/// Reads in chunks to keep memory use bounded.
pub fn sha1_path(path: &Path) -> Result<String> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = Sha1::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = f
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// SHA-1 of an in-memory buffer, lowercase hex.
pub fn sha1_bytes(data: &[u8]) -> String {
    hex::encode(Sha1::digest(data))
}

/// Compare two hex digests ignoring case and surrounding whitespace.
pub fn digests_match(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn sha1_path_empty_file() {
        let f = tempfile::NamedTempFile::new().unwrap();
        let digest = sha1_path(f.path()).unwrap();
        assert_eq!(digest, "da39a3ee5e6b4b0d3255bfef95601890afd80709");
    }

    #[test]
    fn sha1_path_known_content() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"hello\n").unwrap();
        f.flush().unwrap();
        let digest = sha1_path(f.path()).unwrap();
        assert_eq!(digest, "f572d396fae9206628714fb2ce00f72e94f2258f");
        assert_eq!(sha1_bytes(b"hello\n"), digest);
    }

    #[test]
    fn sha1_path_spans_multiple_chunks() {
        let data: Vec<u8> = (0u8..=250).cycle().take(BUF_SIZE * 2 + 17).collect();
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(&data).unwrap();
        f.flush().unwrap();
        assert_eq!(sha1_path(f.path()).unwrap(), sha1_bytes(&data));
    }

    #[test]
    fn sha1_path_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(sha1_path(&dir.path().join("missing.zip")).is_err());
    }

    #[test]
    fn digest_comparison_ignores_case() {
        assert!(digests_match("ABCDEF", "abcdef"));
        assert!(digests_match(" abc ", "abc"));
        assert!(!digests_match("abc", "abd"));
    }
}
