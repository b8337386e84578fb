//! Story list refresh.
//!
//! A refresh fetches the ID list of the current story type, keeps the
//! highlighted story visible even when it dropped out of the feed, and
//! resolves every ID to an item through the session cache.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::app::Result;
use crate::cache::Freshness;
use crate::domain::{Item, StoryType};
use crate::fetcher::parallel::ParallelFetcher;
use crate::fetcher::Fetcher;

pub const DEFAULT_STORY_LIMIT: usize = 20;
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq)]
pub struct StoryRow {
    pub item: Item,
    pub highlighted: bool,
}

impl StoryRow {
    pub fn id(&self) -> u64 {
        self.item.id
    }

    pub fn title(&self) -> &str {
        self.item.display_title()
    }
}

#[derive(Debug, Clone)]
pub struct StoryList {
    pub story_type: StoryType,
    pub rows: Vec<StoryRow>,
    pub fetched_at: DateTime<Utc>,
}

impl StoryList {
    pub fn highlighted_index(&self) -> Option<usize> {
        self.rows.iter().position(|row| row.highlighted)
    }
}

/// Keep the first occurrence of every ID.
pub fn dedupe_ids(ids: &mut Vec<u64>) {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.retain(|id| seen.insert(*id));
}

/// Append `highlight` unless it is already listed. Running it twice changes nothing.
pub fn merge_highlight(ids: &mut Vec<u64>, highlight: Option<u64>) {
    if let Some(id) = highlight {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
}

/// Fetch and resolve the story list for `story_type`.
///
/// Fails as a whole when the list or any item request fails. IDs the API
/// answers with `null` are left out.
pub async fn refresh_story_list(
    fetcher: &(dyn Fetcher + Send + Sync),
    parallel: &ParallelFetcher,
    story_type: StoryType,
    limit: usize,
    highlight: Option<u64>,
) -> Result<StoryList> {
    let mut ids = fetcher.fetch_story_ids(story_type, limit).await?;
    dedupe_ids(&mut ids);
    merge_highlight(&mut ids, highlight);

    let items = parallel.fetch_all(&ids, Freshness::Any).await?;

    let rows: Vec<StoryRow> = items
        .into_iter()
        .flatten()
        .map(|item| StoryRow {
            highlighted: Some(item.id) == highlight,
            item,
        })
        .collect();

    tracing::debug!("Refreshed {} list: {} stories", story_type, rows.len());

    Ok(StoryList {
        story_type,
        rows,
        fetched_at: Utc::now(),
    })
}

/// Serializes refreshes and tags each with a generation so results of a
/// superseded refresh can be dropped.
#[derive(Debug, Default)]
pub struct RefreshGate {
    generation: u64,
    in_flight: bool,
}

impl RefreshGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a scheduled refresh. `None` while another one is still running.
    pub fn try_begin(&mut self) -> Option<u64> {
        if self.in_flight {
            return None;
        }
        Some(self.begin())
    }

    /// Start a refresh that supersedes whatever is in flight.
    pub fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.in_flight = true;
        self.generation
    }

    /// Whether the result of `generation` should be applied.
    pub fn finish(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            tracing::debug!("Dropping superseded refresh {}", generation);
            return false;
        }
        self.in_flight = false;
        true
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }
}

/// Repeating refresh timer.
///
/// The first tick fires one period after start. Ticks are skipped while
/// paused. Dropping the timer stops it.
pub struct RefreshTimer {
    paused: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl RefreshTimer {
    pub fn start<F>(period: Duration, on_tick: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let paused = Arc::new(AtomicBool::new(false));
        let paused_flag = paused.clone();

        let handle = tokio::spawn(async move {
            let mut timer = interval(period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
            timer.tick().await; // Skip the first immediate tick

            loop {
                timer.tick().await;
                if !paused_flag.load(Ordering::SeqCst) {
                    on_tick();
                }
            }
        });

        tracing::debug!("Refresh timer started ({:?})", period);

        Self { paused, handle }
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for RefreshTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{ItemCache, ItemLoader};
    use crate::fetcher::mock::{story, MockFetcher};
    use crate::store::MemoryStore;
    use std::sync::atomic::AtomicUsize;

    fn setup(fetcher: Arc<MockFetcher>) -> ParallelFetcher {
        let loader = ItemLoader::new(fetcher, ItemCache::new(Arc::new(MemoryStore::new())));
        ParallelFetcher::with_workers(loader, 4)
    }

    #[test]
    fn test_merge_highlight_appends_once() {
        let mut ids = vec![1, 2, 3];
        merge_highlight(&mut ids, Some(9));
        merge_highlight(&mut ids, Some(9));
        assert_eq!(ids, vec![1, 2, 3, 9]);
    }

    #[test]
    fn test_merge_highlight_present_or_absent() {
        let mut ids = vec![1, 2, 3];
        merge_highlight(&mut ids, Some(2));
        assert_eq!(ids, vec![1, 2, 3]);

        merge_highlight(&mut ids, None);
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let mut ids = vec![3, 1, 3, 2, 1];
        dedupe_ids(&mut ids);
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn test_rows_follow_feed_order_with_highlight() {
        let fetcher = Arc::new(MockFetcher::with_items([
            story(1, "A", "a", vec![]),
            story(2, "B", "b", vec![]),
            story(3, "C", "c", vec![]),
        ]));
        fetcher.set_story_ids(StoryType::Top, vec![1, 2, 3]);
        let parallel = setup(fetcher.clone());

        let list = refresh_story_list(fetcher.as_ref(), &parallel, StoryType::Top, 20, Some(2))
            .await
            .unwrap();

        let titles: Vec<&str> = list.rows.iter().map(|r| r.title()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
        let highlighted: Vec<bool> = list.rows.iter().map(|r| r.highlighted).collect();
        assert_eq!(highlighted, vec![false, true, false]);
        assert_eq!(list.highlighted_index(), Some(1));
    }

    #[tokio::test]
    async fn test_highlight_outside_feed_is_appended() {
        let fetcher = Arc::new(MockFetcher::with_items([
            story(1, "A", "a", vec![]),
            story(2, "B", "b", vec![]),
            story(77, "Old favourite", "c", vec![]),
        ]));
        fetcher.set_story_ids(StoryType::New, vec![1, 2]);
        let parallel = setup(fetcher.clone());

        let list = refresh_story_list(fetcher.as_ref(), &parallel, StoryType::New, 20, Some(77))
            .await
            .unwrap();

        let ids: Vec<u64> = list.rows.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![1, 2, 77]);
        assert!(list.rows[2].highlighted);
    }

    #[tokio::test]
    async fn test_duplicate_ids_render_once() {
        let fetcher = Arc::new(MockFetcher::with_items([
            story(1, "A", "a", vec![]),
            story(2, "B", "b", vec![]),
        ]));
        fetcher.set_story_ids(StoryType::Top, vec![1, 2, 1]);
        let parallel = setup(fetcher.clone());

        let list = refresh_story_list(fetcher.as_ref(), &parallel, StoryType::Top, 20, None)
            .await
            .unwrap();
        assert_eq!(list.rows.len(), 2);
    }

    #[tokio::test]
    async fn test_null_items_skipped() {
        let fetcher = Arc::new(MockFetcher::with_items([story(1, "A", "a", vec![])]));
        fetcher.set_story_ids(StoryType::Top, vec![1, 404]);
        let parallel = setup(fetcher.clone());

        let list = refresh_story_list(fetcher.as_ref(), &parallel, StoryType::Top, 20, None)
            .await
            .unwrap();
        assert_eq!(list.rows.len(), 1);
    }

    #[tokio::test]
    async fn test_item_failure_fails_refresh() {
        let fetcher = Arc::new(MockFetcher::with_items([story(1, "A", "a", vec![])]));
        fetcher.set_story_ids(StoryType::Top, vec![1, 2]);
        fetcher.fail(2);
        let parallel = setup(fetcher.clone());

        let result =
            refresh_story_list(fetcher.as_ref(), &parallel, StoryType::Top, 20, None).await;
        tokio_test::assert_err!(result);
    }

    #[tokio::test]
    async fn test_second_refresh_served_from_cache() {
        let fetcher = Arc::new(MockFetcher::with_items([
            story(1, "A", "a", vec![]),
            story(2, "B", "b", vec![]),
        ]));
        fetcher.set_story_ids(StoryType::Top, vec![1, 2]);
        let parallel = setup(fetcher.clone());

        for _ in 0..2 {
            refresh_story_list(fetcher.as_ref(), &parallel, StoryType::Top, 20, None)
                .await
                .unwrap();
        }
        assert_eq!(fetcher.list_calls(), 2);
        assert_eq!(fetcher.item_calls(), 2);
    }

    #[test]
    fn test_gate_serializes_scheduled_refreshes() {
        let mut gate = RefreshGate::new();
        let first = gate.try_begin().unwrap();
        assert!(gate.try_begin().is_none());
        assert!(gate.finish(first));
        assert!(!gate.in_flight());
        assert!(gate.try_begin().is_some());
    }

    #[test]
    fn test_gate_drops_superseded_results() {
        let mut gate = RefreshGate::new();
        let stale = gate.begin();
        let current = gate.begin();

        assert!(!gate.finish(stale));
        assert!(gate.in_flight());
        assert!(gate.finish(current));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_ticks_every_period() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        let _timer = RefreshTimer::start(Duration::from_secs(60), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_secs(185)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_pause_and_resume() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        let timer = RefreshTimer::start(Duration::from_secs(60), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        timer.pause();
        tokio::time::sleep(Duration::from_secs(125)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);

        timer.resume();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_stops_on_drop() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        let timer = RefreshTimer::start(Duration::from_secs(60), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        drop(timer);

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
    }
}
