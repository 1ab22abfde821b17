//! Persisted display preferences: last-applied table sort.
//! Stored under XDG config dir: $XDG_CONFIG_HOME/bwdash/prefs.json
//! (fallback ~/.config/bwdash/prefs.json). Absence is not an error.

use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    /// Document iteration order, the collector's configured order.
    #[default]
    Document,
    Name,
    RateInDesc,
    RateOutDesc,
}

impl SortBy {
    pub fn next(self) -> Self {
        match self {
            SortBy::Document => SortBy::Name,
            SortBy::Name => SortBy::RateInDesc,
            SortBy::RateInDesc => SortBy::RateOutDesc,
            SortBy::RateOutDesc => SortBy::Document,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortBy::Document => "document",
            SortBy::Name => "name",
            SortBy::RateInDesc => "in rate",
            SortBy::RateOutDesc => "out rate",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PrefsFile {
    #[serde(default)]
    pub sort: SortBy,
    #[serde(default)]
    pub version: u32,
}

pub fn config_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(xdg).join("bwdash")
    } else {
        dirs_next::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bwdash")
    }
}

pub fn prefs_path() -> PathBuf {
    config_dir().join("prefs.json")
}

/// Missing or corrupt file silently falls back to defaults.
pub fn load_prefs() -> PrefsFile {
    let path = prefs_path();
    match fs::read_to_string(&path) {
        Ok(s) => serde_json::from_str(&s).unwrap_or_default(),
        Err(_) => PrefsFile::default(),
    }
}

pub fn save_prefs(p: &PrefsFile) -> std::io::Result<()> {
    let path = prefs_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_vec_pretty(p).expect("serialize prefs");
    fs::write(path, data)
}
