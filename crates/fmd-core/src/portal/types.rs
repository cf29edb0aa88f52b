//! Wire types for the mod portal API.

use serde::{Deserialize, Serialize};

use crate::version::ModVersion;

/// `info_json` block of a release (subset of the mod's `info.json`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InfoJson {
    #[serde(default)]
    pub factorio_version: Option<String>,
    /// Raw dependency declarations, in declaration order.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// One published, versioned artifact of a mod.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    pub version: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub sha1: String,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub released_at: Option<String>,
    #[serde(default)]
    pub info_json: InfoJson,
}

impl Release {
    /// Parsed version, or `None` when the portal string is not a dotted number.
    pub fn mod_version(&self) -> Option<ModVersion> {
        ModVersion::parse(&self.version).ok()
    }

    pub fn dependencies(&self) -> &[String] {
        &self.info_json.dependencies
    }

    pub fn factorio_version(&self) -> Option<&str> {
        self.info_json.factorio_version.as_deref()
    }
}

/// Mod metadata. The catalog and `/mods/{name}` endpoints fill
/// `latest_release`; `/mods/{name}/full` fills `releases`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModInfo {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub downloads_count: u64,
    #[serde(default)]
    pub releases: Vec<Release>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_release: Option<Release>,
}

impl ModInfo {
    /// Move `latest_release` into `releases` when the latter is empty.
    pub fn into_summary(mut self) -> Self {
        if let Some(latest) = self.latest_release.take() {
            if self.releases.is_empty() {
                self.releases.push(latest);
            }
        }
        self
    }

    /// Display title, falling back to the name.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }
}

/// Body of `GET /mods?page_size=max`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogPage {
    #[serde(default)]
    pub results: Vec<ModInfo>,
}
