//! Configuration management.
//!
//! Configuration is read from `~/.config/tangerine/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

pub mod colors;
pub mod hn;
pub mod keybindings;

pub use colors::ColorConfig;
pub use hn::HnConfig;
pub use keybindings::KeybindingConfig;

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub hn: HnConfig,
    pub colors: ColorConfig,
    pub keybindings: KeybindingConfig,
}

impl Config {
    /// Reads `config.toml` from the user's config directory.
    ///
    /// A missing file is created from a commented template. Absent keys keep
    /// their defaults; a file that fails to parse is an error.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_config_path()?)
    }

    /// Load configuration from `config_path`, creating it when missing.
    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        let config_path = config_path.to_path_buf();

        if !config_path.exists() {
            // First run: write a commented template and fall back to defaults
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path.clone(),
            source: e,
        })?;

        tracing::debug!("Loaded config from {}", config_path.display());
        Ok(config)
    }

    /// Get the default config file path: `~/.config/tangerine/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("tangerine").join("config.toml"))
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let default_config = Self::default_config_content();

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(default_config.as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# Tangerine Configuration
#
# Intervals are written as "90s", "1m", "2h", "1d" or plain seconds.
#
# Colors can be specified as:
# - Named colors: Black, Red, Green, Yellow, Blue, Magenta, Cyan, Gray,
#   DarkGray, LightRed, LightGreen, LightYellow, LightBlue, LightMagenta,
#   LightCyan, White, Reset
# - Hex colors: "#RRGGBB" or "#RGB"
#
# Keybindings can be specified as:
# - Single characters: "a", "A", "1", "+"
# - Special keys: Enter, Tab, BackTab, Backspace, Delete, Home, End,
#   PageUp, PageDown, Up, Down, Left, Right, Esc, Space, F1-F12
# - With modifiers: "Ctrl+c", "Shift+Tab", "Alt+Enter"

[hn]
api_root = "https://hacker-news.firebaseio.com/v0"

# Feed shown until another one is picked: top, new, best, ask, show, job
story_type = "top"

# Number of stories fetched per refresh
story_limit = 20

# How often the story list is refreshed
refresh_interval = "1m"

# Top-level comments loaded per "load more"
batch_size = 10

# Cached comments older than this are fetched again
comment_max_age = "2h"

# Maximum concurrent item requests
workers = 10

[colors]
active_border = "#FF6600"
inactive_border = "DarkGray"

selection_bg_active = "#FF6600"
selection_fg_active = "Black"
selection_bg_inactive = "DarkGray"
selection_fg_inactive = "White"

# Highlighted story and story type
highlight = "#FF6600"
story_meta = "DarkGray"

comment_author = "Yellow"
op_author = "LightRed"
link = "Blue"
load_more = "Cyan"

status_fg = "White"
status_bg = "DarkGray"

[keybindings]
# Navigation
quit = ["q", "Ctrl+c"]
move_up = ["k", "Up"]
move_down = ["j", "Down"]
next_page = ["n", "PageDown"]
prev_page = ["p", "PageUp"]
next_pane = ["Tab"]
prev_pane = ["BackTab", "Shift+Tab"]
next_story_type = ["l", "Right"]
prev_story_type = ["h", "Left"]

# Actions
select = ["Enter", "Space"]
load_more = ["L"]
expand_all = ["E"]
open_link = ["o"]
open_discussion = ["c"]
search_host = ["s"]
search_url = ["u"]
refresh = ["R"]
toggle_maximize = ["m"]
"##
        .to_string()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no config directory on this platform")]
    NoConfigDir,

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;
    use std::time::Duration;

    #[test]
    fn test_default_config_deserializes() {
        let content = Config::default_config_content();
        let config: Config = toml::from_str(&content).expect("Default config should be valid TOML");

        assert_eq!(config.hn.story_limit, 20);
        assert_eq!(config.hn.refresh_interval, Duration::from_secs(60));
        assert_eq!(config.colors.highlight, Color::Rgb(255, 102, 0));
        assert_eq!(config.keybindings.load_more, vec!["L"]);
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
[hn]
story_type = "askstories"
batch_size = 5
comment_max_age = "30m"
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert_eq!(config.hn.story_type, crate::domain::StoryType::Ask);
        assert_eq!(config.hn.batch_size, 5);
        assert_eq!(config.hn.comment_max_age, Duration::from_secs(1800));
        // Untouched values keep their defaults
        assert_eq!(config.hn.story_limit, 20);
        assert_eq!(config.colors.inactive_border, Color::DarkGray);
    }

    #[test]
    fn test_bad_interval_rejected() {
        let content = "[hn]\nrefresh_interval = \"often\"\n";
        assert!(toml::from_str::<Config>(content).is_err());
    }

    #[test]
    fn test_load_from_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tangerine").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.hn.batch_size, 10);

        std::fs::write(&path, "[hn]\nstory_limit = 30\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.hn.story_limit, 30);
    }

    #[test]
    fn test_load_from_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[hn\n").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
