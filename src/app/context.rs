use std::path::PathBuf;
use std::sync::Arc;

use crate::app::error::{AppError, Result};
use crate::cache::{Freshness, ItemCache, ItemLoader};
use crate::config::HnConfig;
use crate::domain::StoryType;
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::parallel::ParallelFetcher;
use crate::fetcher::Fetcher;
use crate::refresh::{self, StoryList};
use crate::store::{KeyValueStore, MemoryStore, Preferences, SqliteStore};
use crate::thread::Thread;

pub struct AppContext {
    pub prefs: Preferences,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub parallel_fetcher: ParallelFetcher,
    pub hn: HnConfig,
}

impl AppContext {
    pub fn new(db_path: Option<PathBuf>, hn: HnConfig) -> Result<Self> {
        let db_path = match db_path {
            Some(p) => p,
            None => Self::default_db_path()?,
        };

        let store = Arc::new(SqliteStore::new(&db_path)?);
        let fetcher = Arc::new(HttpFetcher::new(&hn.api_root)?);
        Ok(Self::with_parts(fetcher, store, hn))
    }

    pub fn with_parts(
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        prefs_store: Arc<dyn KeyValueStore>,
        hn: HnConfig,
    ) -> Self {
        let session = ItemCache::new(Arc::new(MemoryStore::new()));
        let loader = ItemLoader::new(fetcher.clone(), session);
        let parallel_fetcher = ParallelFetcher::with_workers(loader, hn.workers);

        Self {
            prefs: Preferences::new(prefs_store),
            fetcher,
            parallel_fetcher,
            hn,
        }
    }

    pub fn loader(&self) -> &ItemLoader {
        self.parallel_fetcher.loader()
    }

    pub fn comment_freshness(&self) -> Freshness {
        Freshness::MaxAge(self.hn.comment_max_age)
    }

    /// The persisted story type, or the configured default when none was picked.
    pub fn story_type(&self) -> Result<StoryType> {
        Ok(self.prefs.story_type()?.unwrap_or(self.hn.story_type))
    }

    /// Refresh `story_type` keeping the persisted highlight visible.
    pub async fn refresh_stories(&self, story_type: StoryType) -> Result<StoryList> {
        let highlight = self.prefs.highlight()?;
        refresh::refresh_story_list(
            self.fetcher.as_ref(),
            &self.parallel_fetcher,
            story_type,
            self.hn.story_limit,
            highlight,
        )
        .await
    }

    /// Fetch a story from the network and start its comment thread.
    pub async fn open_thread(&self, id: u64) -> Result<Thread> {
        let root = self
            .loader()
            .reload_item(id)
            .await?
            .ok_or(AppError::ItemNotFound(id))?;
        Ok(Thread::new(root, self.hn.batch_size))
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| AppError::Config("Could not find data directory".into()))?;
        let app_dir = data_dir.join("tangerine");
        std::fs::create_dir_all(&app_dir)?;
        Ok(app_dir.join("prefs.db"))
    }
}
