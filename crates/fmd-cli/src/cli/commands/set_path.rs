//! `fmd set-path` – validate and persist the Factorio game directory.

use anyhow::{bail, Context as _, Result};
use fmd_core::config::FmdConfig;
use fmd_core::install::is_factorio_dir;
use std::path::Path;

pub async fn run_set_path(mut cfg: FmdConfig, path: &Path) -> Result<()> {
    if !is_factorio_dir(path) {
        bail!(
            "invalid path {}: the directory must exist and contain `mods` or `data`",
            path.display()
        );
    }
    let path = path
        .canonicalize()
        .with_context(|| format!("resolve {}", path.display()))?;
    cfg.factorio_path = Some(path.clone());
    cfg.save()?;
    tracing::info!(path = %path.display(), "factorio path set");
    println!("Factorio path set to {}", path.display());
    Ok(())
}
