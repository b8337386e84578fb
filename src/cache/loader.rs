use std::sync::Arc;

use crate::app::Result;
use crate::cache::{Freshness, ItemCache};
use crate::domain::Item;
use crate::fetcher::Fetcher;

/// Cache-first item lookup.
#[derive(Clone)]
pub struct ItemLoader {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    cache: ItemCache,
}

impl ItemLoader {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>, cache: ItemCache) -> Self {
        Self { fetcher, cache }
    }

    pub fn cache(&self) -> &ItemCache {
        &self.cache
    }

    /// Return the cached item when `freshness` accepts it, otherwise fetch it
    /// and refresh the cache. `Ok(None)` means the API has nothing for the ID
    /// yet; such answers are not cached, so the next read asks again.
    pub async fn get_item(&self, id: u64, freshness: Freshness) -> Result<Option<Item>> {
        if let Some(entry) = self.cache.get(id, freshness)? {
            tracing::trace!("Cache hit for item {}", id);
            return Ok(entry.item);
        }

        self.reload_item(id).await
    }

    /// Fetch from the network unconditionally and refresh the cache.
    pub async fn reload_item(&self, id: u64) -> Result<Option<Item>> {
        let item = self.fetcher.fetch_item(id).await?;
        match &item {
            Some(found) => self.cache.put(id, Some(found))?,
            None => tracing::debug!("Item {} not available yet, leaving it uncached", id),
        }
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppError;
    use crate::fetcher::mock::{story, MockFetcher};
    use crate::store::MemoryStore;
    use chrono::Utc;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    fn loader(fetcher: Arc<MockFetcher>) -> ItemLoader {
        ItemLoader::new(fetcher, ItemCache::new(Arc::new(MemoryStore::new())))
    }

    #[tokio::test]
    async fn test_cache_hit_skips_network() {
        let fetcher = Arc::new(MockFetcher::with_items([story(1, "A", "pg", vec![])]));
        let loader = loader(fetcher.clone());

        let first = assert_ok!(loader.get_item(1, Freshness::Any).await);
        let second = assert_ok!(loader.get_item(1, Freshness::Any).await);

        assert_eq!(first, second);
        assert_eq!(fetcher.item_calls(), 1);
    }

    #[tokio::test]
    async fn test_stored_item_returned_without_fetch() {
        let fetcher = Arc::new(MockFetcher::new());
        let loader = loader(fetcher.clone());
        let item = story(2, "B", "pg", vec![10, 11]);

        loader.cache().put(2, Some(&item)).unwrap();
        let got = loader.get_item(2, Freshness::Any).await.unwrap();

        assert_eq!(got, Some(item));
        assert_eq!(fetcher.item_calls(), 0);
    }

    #[tokio::test]
    async fn test_stale_entry_refetched_once() {
        let fetcher = Arc::new(MockFetcher::with_items([story(3, "fresh", "pg", vec![])]));
        let loader = loader(fetcher.clone());
        let old = Utc::now() - chrono::Duration::hours(3);
        loader
            .cache()
            .put_at(3, Some(&story(3, "stale", "pg", vec![])), old)
            .unwrap();

        let max_age = Freshness::MaxAge(Duration::from_secs(2 * 60 * 60));
        let got = loader.get_item(3, max_age).await.unwrap().unwrap();
        assert_eq!(got.title.as_deref(), Some("fresh"));
        assert_eq!(fetcher.item_calls(), 1);

        // The refreshed entry now satisfies the same predicate
        loader.get_item(3, max_age).await.unwrap();
        assert_eq!(fetcher.item_calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_item_is_not_cached() {
        let fetcher = Arc::new(MockFetcher::new());
        let loader = loader(fetcher.clone());

        assert_eq!(loader.get_item(404, Freshness::Any).await.unwrap(), None);
        assert!(loader.cache().is_empty().unwrap());

        // Items that show up late are picked up on the next read
        fetcher.insert(story(404, "Late", "pg", vec![]));
        let got = loader.get_item(404, Freshness::Any).await.unwrap();
        assert_eq!(got.and_then(|i| i.title).as_deref(), Some("Late"));
        assert_eq!(fetcher.item_calls(), 2);
    }

    #[tokio::test]
    async fn test_http_failure_propagates_and_is_not_cached() {
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.fail(7);
        let loader = loader(fetcher.clone());

        let err = assert_err!(loader.get_item(7, Freshness::Any).await);
        assert!(matches!(err, AppError::HttpStatus { status: 503, .. }));
        assert!(loader.cache().is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_reload_bypasses_cache() {
        let fetcher = Arc::new(MockFetcher::with_items([story(4, "A", "pg", vec![])]));
        let loader = loader(fetcher.clone());

        loader.get_item(4, Freshness::Any).await.unwrap();
        loader.reload_item(4).await.unwrap();
        assert_eq!(fetcher.item_calls(), 2);
    }
}
