//! The game's `mod-list.json` (enabled/disabled state per mod).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::depspec::BASE_MOD;

/// File name the game reads from its `mods` directory.
pub const MOD_LIST_FILE: &str = "mod-list.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModListEntry {
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModList {
    #[serde(default)]
    pub mods: Vec<ModListEntry>,
}

impl ModList {
    pub fn load(path: &Path) -> Result<Self> {
        let data =
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        serde_json::from_str(&data).with_context(|| format!("parse {}", path.display()))
    }

    /// Enabled mod names in file order, without `base`.
    pub fn enabled_mods(&self) -> Vec<&str> {
        self.mods
            .iter()
            .filter(|m| m.enabled && m.name != BASE_MOD)
            .map(|m| m.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enabled_mods_skip_base_and_disabled() {
        let list: ModList = serde_json::from_str(
            r#"{"mods":[
                {"name":"base","enabled":true},
                {"name":"flib","enabled":true},
                {"name":"old","enabled":false},
                {"name":"noflag"},
                {"name":"space-age","enabled":true}
            ]}"#,
        )
        .unwrap();
        assert_eq!(list.enabled_mods(), vec!["flib", "space-age"]);
    }

    #[test]
    fn load_reports_path_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MOD_LIST_FILE);
        fs::write(&path, "{ not json").unwrap();
        let err = ModList::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains(MOD_LIST_FILE));

        let missing = ModList::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(format!("{:#}", missing).contains("absent.json"));
    }
}
