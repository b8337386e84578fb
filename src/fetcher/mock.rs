//! In-memory [`Fetcher`] for tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::app::{AppError, Result};
use crate::domain::{Item, StoryType};
use crate::fetcher::Fetcher;

#[derive(Default)]
pub struct MockFetcher {
    items: Mutex<HashMap<u64, Item>>,
    story_ids: Mutex<HashMap<StoryType, Vec<u64>>>,
    failing: Mutex<HashSet<u64>>,
    item_calls: AtomicUsize,
    list_calls: AtomicUsize,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: impl IntoIterator<Item = Item>) -> Self {
        let fetcher = Self::new();
        for item in items {
            fetcher.insert(item);
        }
        fetcher
    }

    pub fn insert(&self, item: Item) {
        self.items.lock().unwrap().insert(item.id, item);
    }

    pub fn set_story_ids(&self, story_type: StoryType, ids: Vec<u64>) {
        self.story_ids.lock().unwrap().insert(story_type, ids);
    }

    /// Requests for `id` answer 503.
    pub fn fail(&self, id: u64) {
        self.failing.lock().unwrap().insert(id);
    }

    pub fn item_calls(&self) -> usize {
        self.item_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

/// A story with the given kids, authored by `op`.
pub fn story(id: u64, title: &str, op: &str, kids: Vec<u64>) -> Item {
    Item {
        id,
        title: Some(title.to_string()),
        by: Some(op.to_string()),
        kids: if kids.is_empty() { None } else { Some(kids) },
        ..Item::default()
    }
}

/// A comment with the given kids.
pub fn comment(id: u64, by: &str, text: &str, kids: Vec<u64>) -> Item {
    Item {
        id,
        by: Some(by.to_string()),
        text: Some(text.to_string()),
        kids: if kids.is_empty() { None } else { Some(kids) },
        ..Item::default()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch_story_ids(&self, story_type: StoryType, limit: usize) -> Result<Vec<u64>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let ids = self
            .story_ids
            .lock()
            .unwrap()
            .get(&story_type)
            .cloned()
            .unwrap_or_default();
        Ok(ids.into_iter().take(limit).collect())
    }

    async fn fetch_item(&self, id: u64) -> Result<Option<Item>> {
        self.item_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().unwrap().contains(&id) {
            return Err(AppError::HttpStatus {
                status: 503,
                reason: "Service Unavailable".to_string(),
            });
        }
        Ok(self.items.lock().unwrap().get(&id).cloned())
    }
}
