//! Disk I/O and file lifecycle for artifacts and small state files.
//!
//! Downloads are written to a `.part` sibling and only renamed onto the final
//! path after verification, so an interrupted or rejected transfer never
//! leaves a partial file where a finished one is expected.

mod part;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub use part::PartFile;

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `mod.zip` → `mod.zip.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Rename a finished temp file onto its final path.
pub fn finalize(temp_path: &Path, final_path: &Path) -> Result<()> {
    std::fs::rename(temp_path, final_path).with_context(|| {
        format!(
            "failed to rename {} to {}",
            temp_path.display(),
            final_path.display()
        )
    })
}

/// Remove a file if present. Missing files are not an error.
pub fn discard(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("remove {}", path.display())),
    }
}

/// Write `bytes` to `path` via temp file + fsync + rename (creates parent dir if needed).
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir: {}", parent.display()))?;
        }
    }
    let tmp = temp_path(path);
    let mut part = PartFile::create(&tmp)?;
    part.write_all(bytes)?;
    part.sync()?;
    part.finalize(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_appends_part() {
        let p = temp_path(Path::new("mod_1.0.0.zip"));
        assert_eq!(p.to_string_lossy(), "mod_1.0.0.zip.part");
        let p2 = temp_path(Path::new("/tmp/cache/checksums.json"));
        assert_eq!(p2.to_string_lossy(), "/tmp/cache/checksums.json.part");
    }

    #[test]
    fn write_atomic_creates_parent_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("state.json");
        write_atomic(&target, b"{}").unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"{}");
        assert!(!temp_path(&target).exists());

        write_atomic(&target, b"{\"a\":1}").unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"{\"a\":1}");
    }

    #[test]
    fn discard_missing_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("nope.part");
        discard(&p).unwrap();
        std::fs::write(&p, b"x").unwrap();
        discard(&p).unwrap();
        assert!(!p.exists());
    }
}
