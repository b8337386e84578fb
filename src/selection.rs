//! Highlight and selection state.

use crate::domain::StoryType;

/// A group of siblings of which at most one is highlighted.
#[derive(Debug, Clone)]
pub struct HighlightGroup<K> {
    entries: Vec<(K, bool)>,
}

impl<K: PartialEq + Clone> HighlightGroup<K> {
    pub fn new(keys: impl IntoIterator<Item = K>) -> Self {
        Self {
            entries: keys.into_iter().map(|k| (k, false)).collect(),
        }
    }

    /// Clear every sibling, then mark `key`. Returns false if `key` is not a sibling.
    pub fn highlight(&mut self, key: &K) -> bool {
        for entry in &mut self.entries {
            entry.1 = false;
        }
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => {
                entry.1 = true;
                true
            }
            None => false,
        }
    }

    pub fn highlighted(&self) -> Option<&K> {
        self.entries.iter().find(|(_, h)| *h).map(|(k, _)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, bool)> {
        self.entries.iter().map(|(k, h)| (k, *h))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Nothing,
    StoryType(StoryType),
    Item { story_type: StoryType, id: u64 },
}

/// Side effects requested by a selection change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    PersistStoryType(StoryType),
    PersistHighlight(u64),
    RefreshList,
    LoadComments(u64),
    PauseRefresh,
    ResumeRefresh,
}

/// Selection state with the full-screen comments view flag.
#[derive(Debug, Clone)]
pub struct SelectionState {
    selection: Selection,
    comments_open: bool,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionState {
    pub fn new() -> Self {
        Self {
            selection: Selection::Nothing,
            comments_open: false,
        }
    }

    pub fn story_type(&self) -> Option<StoryType> {
        match self.selection {
            Selection::Nothing => None,
            Selection::StoryType(t) | Selection::Item { story_type: t, .. } => Some(t),
        }
    }

    fn item(&self) -> Option<u64> {
        match self.selection {
            Selection::Item { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn comments_open(&self) -> bool {
        self.comments_open
    }

    /// Switching feeds keeps the selected item so it stays visible in the new list.
    pub fn select_story_type(&mut self, story_type: StoryType) -> Vec<Effect> {
        self.selection = match self.selection {
            Selection::Item { id, .. } => Selection::Item { story_type, id },
            _ => Selection::StoryType(story_type),
        };
        vec![Effect::PersistStoryType(story_type), Effect::RefreshList]
    }

    pub fn select_item(&mut self, id: u64) -> Vec<Effect> {
        let story_type = self.story_type().unwrap_or_default();
        self.selection = Selection::Item { story_type, id };
        vec![Effect::PersistHighlight(id), Effect::LoadComments(id)]
    }

    pub fn open_comments(&mut self) -> Vec<Effect> {
        if self.comments_open || self.item().is_none() {
            return Vec::new();
        }
        self.comments_open = true;
        vec![Effect::PauseRefresh]
    }

    pub fn close_comments(&mut self) -> Vec<Effect> {
        if !self.comments_open {
            return Vec::new();
        }
        self.comments_open = false;
        vec![Effect::ResumeRefresh]
    }
}
