//! Keybinding configuration for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::Deserialize;

use crate::tui::event::Action;

/// Configuration for all keybindings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeybindingConfig {
    pub quit: Vec<String>,
    pub move_up: Vec<String>,
    pub move_down: Vec<String>,
    pub next_page: Vec<String>,
    pub prev_page: Vec<String>,
    pub next_pane: Vec<String>,
    pub prev_pane: Vec<String>,
    pub select: Vec<String>,
    pub next_story_type: Vec<String>,
    pub prev_story_type: Vec<String>,
    pub load_more: Vec<String>,
    pub expand_all: Vec<String>,
    pub open_link: Vec<String>,
    pub open_discussion: Vec<String>,
    pub search_host: Vec<String>,
    pub search_url: Vec<String>,
    pub refresh: Vec<String>,
    pub toggle_maximize: Vec<String>,
}

fn keys(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

impl Default for KeybindingConfig {
    fn default() -> Self {
        Self {
            quit: keys(&["q", "Ctrl+c"]),
            move_up: keys(&["k", "Up"]),
            move_down: keys(&["j", "Down"]),
            next_page: keys(&["n", "PageDown"]),
            prev_page: keys(&["p", "PageUp"]),
            next_pane: keys(&["Tab"]),
            prev_pane: keys(&["BackTab", "Shift+Tab"]),
            select: keys(&["Enter", "Space"]),
            next_story_type: keys(&["l", "Right"]),
            prev_story_type: keys(&["h", "Left"]),
            load_more: keys(&["L"]),
            expand_all: keys(&["E"]),
            open_link: keys(&["o"]),
            open_discussion: keys(&["c"]),
            search_host: keys(&["s"]),
            search_url: keys(&["u"]),
            refresh: keys(&["R"]),
            toggle_maximize: keys(&["m"]),
        }
    }
}

impl KeybindingConfig {
    /// Get the action for a key event. Earlier entries win on conflicts.
    pub fn get_action(&self, key: &KeyEvent) -> Action {
        let table: [(&[String], Action); 18] = [
            (&self.quit, Action::Quit),
            (&self.move_up, Action::MoveUp),
            (&self.move_down, Action::MoveDown),
            (&self.next_page, Action::NextPage),
            (&self.prev_page, Action::PrevPage),
            (&self.next_pane, Action::NextPane),
            (&self.prev_pane, Action::PrevPane),
            (&self.select, Action::Select),
            (&self.next_story_type, Action::NextStoryType),
            (&self.prev_story_type, Action::PrevStoryType),
            (&self.load_more, Action::LoadMore),
            (&self.expand_all, Action::ExpandAll),
            (&self.open_link, Action::OpenLink),
            (&self.open_discussion, Action::OpenDiscussion),
            (&self.search_host, Action::SearchHost),
            (&self.search_url, Action::SearchUrl),
            (&self.refresh, Action::Refresh),
            (&self.toggle_maximize, Action::ToggleMaximize),
        ];

        table
            .iter()
            .find(|(bindings, _)| matches_key(key, bindings))
            .map(|(_, action)| *action)
            .unwrap_or(Action::None)
    }
}

fn matches_key(key: &KeyEvent, bindings: &[String]) -> bool {
    bindings.iter().any(|binding| {
        parse_key_string(binding)
            .map(|parsed| parsed.matches(key))
            .unwrap_or(false)
    })
}

/// A parsed key binding with code and modifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    /// Shift is ignored when the binding itself doesn't ask for it, so `"E"` matches Shift+E.
    pub fn matches(&self, key: &KeyEvent) -> bool {
        self.code == key.code
            && (self.modifiers == key.modifiers
                || self.modifiers == (key.modifiers & !KeyModifiers::SHIFT))
    }
}

const NAMED_KEYS: &[(&str, KeyCode)] = &[
    ("enter", KeyCode::Enter),
    ("return", KeyCode::Enter),
    ("tab", KeyCode::Tab),
    ("backtab", KeyCode::BackTab),
    ("backspace", KeyCode::Backspace),
    ("bs", KeyCode::Backspace),
    ("delete", KeyCode::Delete),
    ("del", KeyCode::Delete),
    ("home", KeyCode::Home),
    ("end", KeyCode::End),
    ("pageup", KeyCode::PageUp),
    ("pgup", KeyCode::PageUp),
    ("pagedown", KeyCode::PageDown),
    ("pgdn", KeyCode::PageDown),
    ("up", KeyCode::Up),
    ("down", KeyCode::Down),
    ("left", KeyCode::Left),
    ("right", KeyCode::Right),
    ("esc", KeyCode::Esc),
    ("escape", KeyCode::Esc),
    ("space", KeyCode::Char(' ')),
];

const MODIFIERS: &[(&str, KeyModifiers)] = &[
    ("ctrl", KeyModifiers::CONTROL),
    ("control", KeyModifiers::CONTROL),
    ("shift", KeyModifiers::SHIFT),
    ("alt", KeyModifiers::ALT),
];

/// Parses a binding such as `"j"`, `"PageDown"`, `"F5"` or `"Ctrl+Alt+r"`.
///
/// Single characters keep their case. Key and modifier names are
/// case-insensitive.
pub fn parse_key_string(s: &str) -> Result<KeyBinding, String> {
    let s = s.trim();

    // A trailing "+" is the plus key itself: "+", "Ctrl++"
    let (prefix, key_part) = match s.strip_suffix('+') {
        Some(rest) if rest.is_empty() || rest.ends_with('+') => {
            (rest.strip_suffix('+').unwrap_or(""), "+")
        }
        _ => s.rsplit_once('+').unwrap_or(("", s)),
    };

    let modifiers = prefix
        .split('+')
        .filter(|p| !p.is_empty())
        .try_fold(KeyModifiers::NONE, |acc, part| {
            lookup(MODIFIERS, part)
                .map(|m| acc | m)
                .ok_or_else(|| format!("Unknown modifier: {}", part))
        })?;

    Ok(KeyBinding {
        code: parse_key_code(key_part)?,
        modifiers,
    })
}

fn lookup<T: Copy>(table: &[(&str, T)], name: &str) -> Option<T> {
    table
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|&(_, v)| v)
}

fn parse_key_code(s: &str) -> Result<KeyCode, String> {
    let mut chars = s.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(KeyCode::Char(c));
    }

    let function_key = s
        .strip_prefix(['f', 'F'])
        .and_then(|n| n.parse::<u8>().ok())
        .filter(|n| (1..=12).contains(n));
    if let Some(n) = function_key {
        return Ok(KeyCode::F(n));
    }

    lookup(NAMED_KEYS, s).ok_or_else(|| format!("Unknown key: {}", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chars_keep_case() {
        let binding = parse_key_string("L").unwrap();
        assert_eq!(binding.code, KeyCode::Char('L'));
        assert_eq!(binding.modifiers, KeyModifiers::NONE);

        assert_eq!(parse_key_string("e").unwrap().code, KeyCode::Char('e'));
    }

    #[test]
    fn test_parse_named_keys() {
        assert_eq!(parse_key_string("Space").unwrap().code, KeyCode::Char(' '));
        assert_eq!(parse_key_string("pgdn").unwrap().code, KeyCode::PageDown);
        assert_eq!(parse_key_string("F5").unwrap().code, KeyCode::F(5));
        assert!(parse_key_string("F13").is_err());
        assert!(parse_key_string("Hyper").is_err());
    }

    #[test]
    fn test_parse_modifiers() {
        let binding = parse_key_string("Ctrl+c").unwrap();
        assert_eq!(binding.code, KeyCode::Char('c'));
        assert_eq!(binding.modifiers, KeyModifiers::CONTROL);

        let binding = parse_key_string("Ctrl+Alt+r").unwrap();
        assert_eq!(binding.modifiers, KeyModifiers::CONTROL | KeyModifiers::ALT);

        assert!(parse_key_string("Super+r").is_err());
    }

    #[test]
    fn test_shifted_char_matches_without_shift_binding() {
        let binding = parse_key_string("E").unwrap();
        let key = KeyEvent::new(KeyCode::Char('E'), KeyModifiers::SHIFT);
        assert!(binding.matches(&key));
    }

    #[test]
    fn test_default_actions() {
        let config = KeybindingConfig::default();
        let action = |code, modifiers| config.get_action(&KeyEvent::new(code, modifiers));

        assert_eq!(action(KeyCode::Char('q'), KeyModifiers::NONE), Action::Quit);
        assert_eq!(action(KeyCode::Char('c'), KeyModifiers::CONTROL), Action::Quit);
        assert_eq!(action(KeyCode::Char('c'), KeyModifiers::NONE), Action::OpenDiscussion);
        assert_eq!(action(KeyCode::Enter, KeyModifiers::NONE), Action::Select);
        assert_eq!(action(KeyCode::Right, KeyModifiers::NONE), Action::NextStoryType);
        assert_eq!(action(KeyCode::Char('L'), KeyModifiers::SHIFT), Action::LoadMore);
        assert_eq!(action(KeyCode::Char('u'), KeyModifiers::NONE), Action::SearchUrl);
        assert_eq!(action(KeyCode::Char('x'), KeyModifiers::NONE), Action::None);
    }

    #[test]
    fn test_parse_plus_key() {
        assert_eq!(parse_key_string("+").unwrap().code, KeyCode::Char('+'));
        let binding = parse_key_string("Ctrl++").unwrap();
        assert_eq!(binding.code, KeyCode::Char('+'));
        assert_eq!(binding.modifiers, KeyModifiers::CONTROL);
    }

    #[test]
    fn test_custom_binding_from_toml() {
        let config: KeybindingConfig = toml::from_str("load_more = [\"+\"]").unwrap();
        let key = KeyEvent::new(KeyCode::Char('+'), KeyModifiers::NONE);
        assert_eq!(config.get_action(&key), Action::LoadMore);
        // Unlisted bindings keep their defaults
        assert_eq!(config.quit, vec!["q", "Ctrl+c"]);
    }
}
