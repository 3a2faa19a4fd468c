//! Saved selections.
//!
//! Two JSON files live next to the playlist: `<stem>.config.json`, the
//! config handed to the generator, and `<stem>.groups.json`, the list of
//! kept groups used to restore the group page. The config is merged on
//! save, so fields written by other tools survive.

use crate::error::Result;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Value of `group_mode`: listed groups are kept, the rest discarded.
pub const GROUP_MODE_KEEP: &str = "keep";

/// The saved selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedConfig {
    /// Playlist URL or local path
    #[serde(default)]
    pub source_url_or_path: String,
    /// Kept group labels
    #[serde(default)]
    pub groups: Vec<String>,
    /// Always [`GROUP_MODE_KEEP`]
    #[serde(default)]
    pub group_mode: String,
    /// Kept channels
    #[serde(default)]
    pub include_channels: Vec<String>,
    /// Candidate channels that were not kept
    #[serde(default)]
    pub discard_channels: Vec<String>,
    /// Generator output directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_directory: Option<String>,
}

impl PersistedConfig {
    /// Build a config from the final selection.
    ///
    /// `discard` is every candidate not in `include`, so the two are disjoint
    /// and both lie within `candidates`.
    pub fn from_selection(
        source: &str,
        groups: &BTreeSet<String>,
        candidates: &BTreeSet<String>,
        include: &BTreeSet<String>,
    ) -> Self {
        Self {
            source_url_or_path: source.to_string(),
            groups: groups.iter().cloned().collect(),
            group_mode: GROUP_MODE_KEEP.to_string(),
            include_channels: candidates.intersection(include).cloned().collect(),
            discard_channels: candidates.difference(include).cloned().collect(),
            output_directory: None,
        }
    }
}

/// Where a playlist's saved files live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPaths {
    pub config: PathBuf,
    pub groups: PathBuf,
}

impl SessionPaths {
    /// `<dir>/<stem>.config.json` and `<dir>/<stem>.groups.json`.
    pub fn for_playlist(playlist: &Path) -> Self {
        let stem = playlist
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "playlist".to_string());
        Self {
            config: playlist.with_file_name(format!("{}.config.json", stem)),
            groups: playlist.with_file_name(format!("{}.groups.json", stem)),
        }
    }
}

/// Load the saved config.
///
/// Returns `None` if there is no file, or if it is not valid JSON of the
/// right shape (logged and ignored; the next save replaces it).
pub fn load_config(path: &Path) -> Option<PersistedConfig> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            debug!("No saved config at {}: {}", path.display(), e);
            return None;
        }
    };

    match serde_json::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!("Ignoring corrupt config {}: {}", path.display(), e);
            None
        }
    }
}

/// Merge `config` into the file at `path`.
///
/// Fields of `config` replace fields of the same name; anything else already
/// in the file is kept. A file that does not hold a JSON object is replaced.
pub fn save_config(path: &Path, config: &PersistedConfig) -> Result<()> {
    let mut merged = read_object(path);

    if let Value::Object(fields) = serde_json::to_value(config)? {
        for (key, value) in fields {
            merged.insert(key, value);
        }
    }

    write_json(path, &Value::Object(merged))
}

fn read_object(path: &Path) -> Map<String, Value> {
    let Ok(content) = fs::read_to_string(path) else {
        return Map::new();
    };
    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(fields)) => fields,
        Ok(_) | Err(_) => {
            warn!("Replacing unreadable config {}", path.display());
            Map::new()
        }
    }
}

/// Load the kept groups of the last run. Missing or corrupt files give `None`.
pub fn load_groups(path: &Path) -> Option<Vec<String>> {
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(groups) => Some(groups),
        Err(e) => {
            warn!("Ignoring corrupt group file {}: {}", path.display(), e);
            None
        }
    }
}

/// Save the kept groups, sorted.
pub fn save_groups(path: &Path, groups: &BTreeSet<String>) -> Result<()> {
    let list: Vec<&String> = groups.iter().collect();
    write_json(path, &serde_json::to_value(list)?)
}

fn write_json(path: &Path, value: &Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content)?;
    debug!("Wrote {}", path.display());
    Ok(())
}
