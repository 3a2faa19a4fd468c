//! Configuration file support for playlist-selector.
//!
//! Everything that used to be a fixed path or a hard-coded list (page sizes,
//! blocked keywords, generator command) lives in [`Settings`], which is loaded
//! once at startup and passed down explicitly.

use crate::error::{AppError, Result};
use crate::selector::SelectorKind;
use crate::view::{ColumnLayout, ViewOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Channel-name keywords that mark a channel as blocked by default.
pub const DEFAULT_BLOCKED_KEYWORDS: &[&str] = &[
    "sports", "adult", "nfl", "nba", "nhl", "mlb", "football", "baseball", "soccer", "espn",
    "fox sports", "bein", "sky sports", "ncaa", "wwe", "ufc", "boxing", "tennis", "golf",
    "cricket", "rugby", "f1", "motogp", "nascar",
];

/// Narrowest usable column: index, checkbox and a few characters of name.
const MIN_COLUMN_WIDTH: usize = 16;

/// Upper bound for `fetch_retries`.
pub const MAX_FETCH_RETRIES: u32 = 10;

/// User configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Groups shown per page
    #[serde(default = "default_group_page_size")]
    pub group_page_size: usize,

    /// Channels shown per page
    #[serde(default = "default_channel_page_size")]
    pub channel_page_size: usize,

    /// Number of grid columns
    #[serde(default = "default_columns")]
    pub columns: usize,

    /// Width of one grid cell in characters
    #[serde(default = "default_column_width")]
    pub column_width: usize,

    /// Cell placement for the group pages
    #[serde(default)]
    pub group_layout: ColumnLayout,

    /// Cell placement for the channel pages
    #[serde(default)]
    pub channel_layout: ColumnLayout,

    /// Case-insensitive substrings that mark a channel as blocked
    #[serde(default = "default_blocked_keywords")]
    pub blocked_keywords: Vec<String>,

    /// Start unblocked channels as kept when there is no saved selection
    #[serde(default)]
    pub preselect_unblocked: bool,

    /// Directory searched for `*.m3u` / `*.m3u8` when no source is given
    #[serde(default = "default_playlist_dir")]
    pub playlist_dir: String,

    /// Where downloaded playlists are stored (defaults to the cache directory)
    #[serde(default)]
    pub download_dir: Option<String>,

    /// Timeout for a playlist download attempt
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Timeout for the existence check before downloading
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,

    /// Extra download attempts on retryable network errors
    #[serde(default = "default_fetch_retries")]
    pub fetch_retries: u32,

    /// Clear the terminal before drawing each page
    #[serde(default)]
    pub clear_screen: bool,

    /// External playlist generator
    #[serde(default)]
    pub generator: Option<GeneratorSettings>,
}

/// How to invoke the external playlist generator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratorSettings {
    /// Program to run
    pub program: String,

    /// Arguments placed before the config path
    #[serde(default)]
    pub args: Vec<String>,

    /// Directory the generator writes into
    #[serde(default = "default_work_dir")]
    pub work_dir: String,

    /// Directory the results are copied to
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// File names copied from `work_dir` to `output_dir`
    #[serde(default = "default_outputs")]
    pub outputs: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

fn default_group_page_size() -> usize {
    150
}

fn default_channel_page_size() -> usize {
    25
}

fn default_columns() -> usize {
    3
}

fn default_column_width() -> usize {
    50
}

fn default_blocked_keywords() -> Vec<String> {
    DEFAULT_BLOCKED_KEYWORDS.iter().map(|k| k.to_string()).collect()
}

fn default_playlist_dir() -> String {
    ".".to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_probe_timeout_secs() -> u64 {
    5
}

fn default_fetch_retries() -> u32 {
    2
}

fn default_work_dir() -> String {
    "temp_m3u_editor_output".to_string()
}

fn default_output_dir() -> String {
    "trimmed".to_string()
}

fn default_outputs() -> Vec<String> {
    [
        "original.m3u",
        "original.channels.txt",
        "original.xml",
        "no_epg_channels.txt",
        "selected.m3u8",
        "selected.xml",
        "process.log",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Settings {
    /// Create settings with default values.
    pub fn new() -> Self {
        Self {
            group_page_size: default_group_page_size(),
            channel_page_size: default_channel_page_size(),
            columns: default_columns(),
            column_width: default_column_width(),
            group_layout: ColumnLayout::default(),
            channel_layout: ColumnLayout::default(),
            blocked_keywords: default_blocked_keywords(),
            preselect_unblocked: false,
            playlist_dir: default_playlist_dir(),
            download_dir: None,
            fetch_timeout_secs: default_fetch_timeout_secs(),
            probe_timeout_secs: default_probe_timeout_secs(),
            fetch_retries: default_fetch_retries(),
            clear_screen: false,
            generator: None,
        }
    }

    /// Get the path to the config file.
    ///
    /// Returns ~/.config/playlist-selector/config.toml on Linux,
    /// or a platform-appropriate location on other systems.
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AppError::Config("Could not find config directory".to_string()))?
            .join("playlist-selector");

        Ok(config_dir.join("config.toml"))
    }

    /// Load settings from `path`, or from the default location.
    ///
    /// A missing file at the default location gives defaults; a missing
    /// file at an explicit `path` is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(AppError::Config(format!(
                        "Settings file not found: {}",
                        p.display()
                    )));
                }
                p.to_path_buf()
            }
            None => Self::get_config_path()?,
        };

        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(&path)?;
        let settings: Settings = toml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Write a default config file if none exists at `path`.
    ///
    /// Returns whether a file was created.
    pub fn create_default_if_missing(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        Self::new().save(path)?;
        Ok(true)
    }

    /// Reject values the pager cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.group_page_size == 0 || self.channel_page_size == 0 {
            return Err(AppError::Config("page sizes must be at least 1".to_string()));
        }
        if self.columns == 0 {
            return Err(AppError::Config("columns must be at least 1".to_string()));
        }
        if self.column_width < MIN_COLUMN_WIDTH {
            return Err(AppError::Config(format!(
                "column_width must be at least {}",
                MIN_COLUMN_WIDTH
            )));
        }
        if self.fetch_retries > MAX_FETCH_RETRIES {
            return Err(AppError::Config(format!(
                "fetch_retries must be at most {}",
                MAX_FETCH_RETRIES
            )));
        }
        if let Some(generator) = &self.generator {
            if generator.program.trim().is_empty() {
                return Err(AppError::Config("generator.program is empty".to_string()));
            }
        }
        Ok(())
    }

    /// Directory for downloaded playlists.
    pub fn download_dir(&self) -> PathBuf {
        match &self.download_dir {
            Some(dir) => PathBuf::from(dir),
            None => dirs::cache_dir()
                .map(|d| d.join("playlist-selector"))
                .unwrap_or_else(|| PathBuf::from("downloads")),
        }
    }

    /// Page size used by the selector for `kind`.
    pub fn page_size(&self, kind: SelectorKind) -> usize {
        match kind {
            SelectorKind::Groups => self.group_page_size,
            SelectorKind::Channels => self.channel_page_size,
        }
    }

    /// Rendering options for the selector of `kind`.
    pub fn view_options(&self, kind: SelectorKind, color: bool) -> ViewOptions {
        let layout = match kind {
            SelectorKind::Groups => self.group_layout,
            SelectorKind::Channels => self.channel_layout,
        };
        ViewOptions {
            columns: self.columns,
            column_width: self.column_width,
            layout,
            color,
            clear_screen: self.clear_screen,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_settings_have_defaults() {
        let settings = Settings::new();
        assert_eq!(settings.group_page_size, 150);
        assert_eq!(settings.channel_page_size, 25);
        assert_eq!(settings.columns, 3);
        assert_eq!(settings.column_width, 50);
        assert!(!settings.preselect_unblocked);
        assert!(settings.generator.is_none());
        assert!(settings.blocked_keywords.iter().any(|k| k == "espn"));
    }

    #[test]
    fn test_partial_deserialization() {
        let toml_str = r#"
            channel_page_size = 30
            channel_layout = "row"
        "#;

        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.channel_page_size, 30);
        assert_eq!(settings.channel_layout, ColumnLayout::Row);
        assert_eq!(settings.group_page_size, 150); // default
        assert_eq!(settings.group_layout, ColumnLayout::Column); // default
    }

    #[test]
    fn test_generator_table() {
        let toml_str = r#"
            [generator]
            program = "python3"
            args = ["m3u-epg-editor-py3.py", "-j"]
        "#;

        let settings: Settings = toml::from_str(toml_str).unwrap();
        let generator = settings.generator.unwrap();
        assert_eq!(generator.program, "python3");
        assert_eq!(generator.args.len(), 2);
        assert_eq!(generator.work_dir, "temp_m3u_editor_output");
        assert!(generator.outputs.contains(&"selected.m3u8".to_string()));
    }

    #[test]
    fn test_validate_rejects_zero_page_size() {
        let mut settings = Settings::new();
        settings.channel_page_size = 0;
        assert!(matches!(settings.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_narrow_columns() {
        let mut settings = Settings::new();
        settings.column_width = 4;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        assert!(Settings::create_default_if_missing(&path).unwrap());
        assert!(!Settings::create_default_if_missing(&path).unwrap());

        let loaded = Settings::load(Some(&path)).unwrap();
        assert_eq!(loaded.group_page_size, 150);
        assert_eq!(loaded.blocked_keywords, default_blocked_keywords());
    }

    #[test]
    fn test_load_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        match err {
            AppError::Config(message) => assert!(message.contains("absent.toml")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_caps_fetch_retries() {
        let mut settings = Settings::new();
        settings.fetch_retries = MAX_FETCH_RETRIES;
        assert!(settings.validate().is_ok());
        settings.fetch_retries = 60;
        assert!(matches!(settings.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_view_options_per_kind() {
        let mut settings = Settings::new();
        settings.channel_layout = ColumnLayout::Row;
        let opts = settings.view_options(SelectorKind::Channels, false);
        assert_eq!(opts.layout, ColumnLayout::Row);
        assert_eq!(settings.page_size(SelectorKind::Groups), 150);
    }
}
