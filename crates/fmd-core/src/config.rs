use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::mirrors::DEFAULT_MIRRORS;
use crate::portal::DEFAULT_REGISTRY;

/// Global configuration loaded from `~/.config/fmd/config.toml`.
///
/// Every field has a default, so a partial file (or an empty one) is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FmdConfig {
    /// Registry API root.
    pub registry_url: String,
    /// Mirror base URLs in initial priority order.
    pub mirrors: Vec<String>,
    /// Artifact cache directory (None = `$XDG_CACHE_HOME/fmd/mod_cache`).
    pub cache_dir: Option<PathBuf>,
    /// Game directory; artifacts are installed into its `mods` subdirectory.
    pub factorio_path: Option<PathBuf>,
    pub user_agent: String,
    /// Pause after each fetched package, before expanding its dependencies.
    pub request_delay_ms: u64,
    pub connect_timeout_secs: u64,
    pub metadata_timeout_secs: u64,
    pub catalog_timeout_secs: u64,
    /// Whole-transfer limit for a single artifact download.
    pub download_timeout_secs: u64,
    /// Listen address for `fmd serve`.
    pub server_bind: String,
    /// Tracing filter directive; `RUST_LOG` overrides it.
    pub log_filter: Option<String>,
}

impl Default for FmdConfig {
    fn default() -> Self {
        Self {
            registry_url: DEFAULT_REGISTRY.to_string(),
            mirrors: DEFAULT_MIRRORS.iter().map(|m| m.to_string()).collect(),
            cache_dir: None,
            factorio_path: None,
            user_agent: "Factorio-Agent".to_string(),
            request_delay_ms: 50,
            connect_timeout_secs: 15,
            metadata_timeout_secs: 15,
            catalog_timeout_secs: 30,
            download_timeout_secs: 300,
            server_bind: "127.0.0.1:5000".to_string(),
            log_filter: None,
        }
    }
}

impl FmdConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_secs(self.metadata_timeout_secs)
    }

    pub fn catalog_timeout(&self) -> Duration {
        Duration::from_secs(self.catalog_timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    /// Configured cache directory, or the XDG default (created if missing).
    pub fn cache_dir(&self) -> Result<PathBuf> {
        match &self.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => {
                let xdg_dirs = xdg::BaseDirectories::with_prefix("fmd")?;
                xdg_dirs
                    .create_cache_directory("mod_cache")
                    .context("create cache directory")
            }
        }
    }

    /// Persist to the default config path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("write config {}", path.display()))?;
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("fmd")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FmdConfig> {
    load_or_init_at(&config_path()?)
}

pub fn load_or_init_at(path: &Path) -> Result<FmdConfig> {
    if !path.exists() {
        let default_cfg = FmdConfig::default();
        default_cfg.save_to(path)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)?;
    let cfg: FmdConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
