use std::sync::Arc;

use crate::app::Result;
use crate::domain::StoryType;
use crate::store::KeyValueStore;

pub const STORY_TYPE_KEY: &str = "storyType";
pub const HIGHLIGHT_KEY: &str = "highlight";

/// Reader preferences that survive restarts: the selected story feed and the
/// highlighted story.
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn KeyValueStore>,
}

impl Preferences {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// `None` when unset or unreadable.
    pub fn story_type(&self) -> Result<Option<StoryType>> {
        let stored = self.store.get(STORY_TYPE_KEY)?;
        Ok(stored.and_then(|s| s.parse().ok()))
    }

    pub fn set_story_type(&self, story_type: StoryType) -> Result<()> {
        self.store.set(STORY_TYPE_KEY, story_type.as_str())
    }

    /// Zero and unparsable values count as no highlight.
    pub fn highlight(&self) -> Result<Option<u64>> {
        let stored = self.store.get(HIGHLIGHT_KEY)?;
        Ok(stored
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|id| *id > 0))
    }

    pub fn set_highlight(&self, id: u64) -> Result<()> {
        tracing::debug!("Persisting highlight {}", id);
        self.store.set(HIGHLIGHT_KEY, &id.to_string())
    }

    pub fn clear_highlight(&self) -> Result<()> {
        self.store.remove(HIGHLIGHT_KEY)
    }
}
