//! Checksum command: compute SHA-1 of a file, as published by the mod portal.

use anyhow::Result;
use fmd_core::checksum;
use std::path::Path;

/// Compute and print SHA-1 of the given file.
pub async fn run_checksum(path: &Path) -> Result<()> {
    let digest = checksum::sha1_path(path)?;
    println!("{}  {}", digest, path.display());
    Ok(())
}
