//! Copy resolved artifacts from the cache into the game's `mods` directory.

use anyhow::{bail, Context, Result};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::checksum::{self, ChecksumCache};
use crate::modlist::MOD_LIST_FILE;
use crate::resolver::VisitedSet;
use crate::storage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallStatus {
    Installed,
    /// Target already present with identical content.
    AlreadyInstalled,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    pub file_name: String,
    pub status: InstallStatus,
}

pub struct Installer {
    cache_dir: PathBuf,
    mods_dir: PathBuf,
    checksums: Arc<Mutex<ChecksumCache>>,
}

impl Installer {
    /// Installer targeting `<game_dir>/mods`.
    pub fn new(
        cache_dir: impl Into<PathBuf>,
        game_dir: &Path,
        checksums: Arc<Mutex<ChecksumCache>>,
    ) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            mods_dir: game_dir.join("mods"),
            checksums,
        }
    }

    pub fn mods_dir(&self) -> &Path {
        &self.mods_dir
    }

    /// Copy one cached artifact into the mods directory.
    pub fn install_file(&self, file_name: &str) -> Result<InstallStatus> {
        if file_name.is_empty() || Path::new(file_name).file_name() != Some(OsStr::new(file_name)) {
            bail!("refusing to install unsafe file name {:?}", file_name);
        }
        let source = self.cache_dir.join(file_name);
        if !source.is_file() {
            bail!("{} is not in the cache", file_name);
        }
        fs::create_dir_all(&self.mods_dir)
            .with_context(|| format!("create {}", self.mods_dir.display()))?;

        let target = self.mods_dir.join(file_name);
        if target.is_file() {
            let source_hash = self
                .checksums
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .get_hash(&source)?;
            let target_hash = checksum::sha1_path(&target)?;
            if checksum::digests_match(&source_hash, &target_hash) {
                return Ok(InstallStatus::AlreadyInstalled);
            }
        }

        copy_into_place(&source, &target)?;
        Ok(InstallStatus::Installed)
    }

    /// Install every resolved file of `visited`, in resolution order.
    /// A failing file is reported and does not stop the rest.
    pub fn install_set(&self, visited: &VisitedSet) -> Vec<InstallOutcome> {
        visited
            .files()
            .into_iter()
            .map(|file_name| {
                let status = match self.install_file(file_name) {
                    Ok(status) => {
                        tracing::info!(file = file_name, ?status, "install");
                        status
                    }
                    Err(e) => {
                        tracing::warn!(file = file_name, "install failed: {:#}", e);
                        InstallStatus::Failed(format!("{:#}", e))
                    }
                };
                InstallOutcome {
                    file_name: file_name.to_string(),
                    status,
                }
            })
            .collect()
    }

    /// Copy a `mod-list.json` into the mods directory.
    pub fn install_mod_list(&self, list: &Path) -> Result<PathBuf> {
        fs::create_dir_all(&self.mods_dir)
            .with_context(|| format!("create {}", self.mods_dir.display()))?;
        let target = self.mods_dir.join(MOD_LIST_FILE);
        copy_into_place(list, &target)?;
        Ok(target)
    }
}

/// Copy via a `.part` sibling and rename so the game never sees a half-written zip.
fn copy_into_place(source: &Path, target: &Path) -> Result<()> {
    let tmp = storage::temp_path(target);
    if let Err(e) = fs::copy(source, &tmp) {
        let _ = storage::discard(&tmp);
        return Err(e).with_context(|| format!("copy {} to {}", source.display(), tmp.display()));
    }
    storage::finalize(&tmp, target)
}

/// A game directory contains `mods` or `data`.
pub fn is_factorio_dir(path: &Path) -> bool {
    path.is_dir() && (path.join("mods").exists() || path.join("data").exists())
}

/// Platform default game directory, if it exists and looks valid.
pub fn default_factorio_dir() -> Option<PathBuf> {
    let candidate = platform_default_dir()?;
    is_factorio_dir(&candidate).then_some(candidate)
}

#[cfg(target_os = "macos")]
fn platform_default_dir() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(PathBuf::from(home).join("Library/Application Support/factorio"))
}

#[cfg(target_os = "windows")]
fn platform_default_dir() -> Option<PathBuf> {
    let home = std::env::var_os("USERPROFILE")?;
    Some(PathBuf::from(home).join("AppData").join("Roaming").join("Factorio"))
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn platform_default_dir() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(PathBuf::from(home).join(".factorio"))
}
