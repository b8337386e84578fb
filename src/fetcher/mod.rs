pub mod http_fetcher;
pub mod parallel;

#[cfg(test)]
pub mod mock;

use async_trait::async_trait;

use crate::app::Result;
use crate::domain::{Item, StoryType};

/// Read access to the Hacker News API.
#[async_trait]
pub trait Fetcher {
    /// IDs of a story feed in upstream priority order, at most `limit` of them.
    async fn fetch_story_ids(&self, story_type: StoryType, limit: usize) -> Result<Vec<u64>>;

    /// A single item. `Ok(None)` when the API answers `null` for the ID.
    async fn fetch_item(&self, id: u64) -> Result<Option<Item>>;
}
