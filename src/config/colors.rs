//! Color configuration for the TUI.

use ratatui::style::Color;
use serde::{de, Deserialize, Deserializer};

/// Configuration for all TUI colors.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    #[serde(deserialize_with = "deserialize_color")]
    pub active_border: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub inactive_border: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub selection_bg_active: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub selection_fg_active: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub selection_bg_inactive: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub selection_fg_inactive: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub highlight: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub story_meta: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub comment_author: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub op_author: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub link: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub load_more: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub status_fg: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub status_bg: Color,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            active_border: Color::Rgb(255, 102, 0),
            inactive_border: Color::DarkGray,
            selection_bg_active: Color::Rgb(255, 102, 0),
            selection_fg_active: Color::Black,
            selection_bg_inactive: Color::DarkGray,
            selection_fg_inactive: Color::White,
            highlight: Color::Rgb(255, 102, 0),
            story_meta: Color::DarkGray,
            comment_author: Color::Yellow,
            op_author: Color::LightRed,
            link: Color::Blue,
            load_more: Color::Cyan,
            status_fg: Color::White,
            status_bg: Color::DarkGray,
        }
    }
}

fn deserialize_color<'de, D>(deserializer: D) -> Result<Color, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_color_string(&s).map_err(de::Error::custom)
}

const NAMED_COLORS: &[(&str, Color)] = &[
    ("black", Color::Black),
    ("red", Color::Red),
    ("green", Color::Green),
    ("yellow", Color::Yellow),
    ("blue", Color::Blue),
    ("magenta", Color::Magenta),
    ("cyan", Color::Cyan),
    ("gray", Color::Gray),
    ("grey", Color::Gray),
    ("darkgray", Color::DarkGray),
    ("darkgrey", Color::DarkGray),
    ("lightred", Color::LightRed),
    ("lightgreen", Color::LightGreen),
    ("lightyellow", Color::LightYellow),
    ("lightblue", Color::LightBlue),
    ("lightmagenta", Color::LightMagenta),
    ("lightcyan", Color::LightCyan),
    ("white", Color::White),
    ("reset", Color::Reset),
];

/// Parse a named color (case-insensitive) or a `#RRGGBB` / `#RGB` hex code.
pub fn parse_color_string(s: &str) -> Result<Color, String> {
    let s = s.trim();

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex_color(hex).ok_or_else(|| format!("Invalid hex color: {}", s));
    }

    let lower = s.to_lowercase();
    NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, color)| *color)
        .ok_or_else(|| format!("Unknown color: {}", s))
}

fn parse_hex_color(hex: &str) -> Option<Color> {
    if !hex.is_ascii() {
        return None;
    }
    let channel = |digits: &str| u8::from_str_radix(digits, 16).ok();

    match hex.len() {
        6 => Some(Color::Rgb(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        // #RGB doubles each digit
        3 => Some(Color::Rgb(
            channel(&hex[0..1])? * 17,
            channel(&hex[1..2])? * 17,
            channel(&hex[2..3])? * 17,
        )),
        _ => None,
    }
}
