//! Session cache for API items.
//!
//! Entries are JSON in a [`KeyValueStore`] keyed by the decimal item ID and
//! stamped with the time they were fetched. Callers pass a [`Freshness`] to
//! decide whether a stamped entry is still usable.

pub mod loader;

pub use loader::ItemLoader;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::app::Result;
use crate::domain::Item;
use crate::store::KeyValueStore;

/// How old a cached entry may be before it counts as a miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Freshness {
    /// Any cached entry is acceptable.
    #[default]
    Any,
    /// Entries fetched longer ago than this are re-fetched.
    MaxAge(Duration),
}

impl Freshness {
    pub fn accepts(&self, fetched_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            Freshness::Any => true,
            Freshness::MaxAge(max_age) => {
                let age = now.signed_duration_since(fetched_at);
                // Timestamps from the future (clock changes) are treated as fresh
                age.to_std().map(|age| age <= *max_age).unwrap_or(true)
            }
        }
    }
}

/// A cached API answer. `item` is `None` when the API returned `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedItem {
    pub item: Option<Item>,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct ItemCache {
    store: Arc<dyn KeyValueStore>,
}

impl ItemCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// A cached entry that satisfies `freshness`.
    ///
    /// Undecodable entries are dropped and reported as a miss.
    pub fn get(&self, id: u64, freshness: Freshness) -> Result<Option<CachedItem>> {
        let key = id.to_string();
        let Some(json) = self.store.get(&key)? else {
            return Ok(None);
        };

        let entry: CachedItem = match serde_json::from_str(&json) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Discarding corrupt cache entry {}: {}", id, e);
                self.store.remove(&key)?;
                return Ok(None);
            }
        };

        if freshness.accepts(entry.fetched_at, Utc::now()) {
            Ok(Some(entry))
        } else {
            tracing::debug!("Cache entry {} is stale", id);
            Ok(None)
        }
    }

    /// Store an API answer, overwriting any previous entry.
    pub fn put(&self, id: u64, item: Option<&Item>) -> Result<()> {
        self.put_at(id, item, Utc::now())
    }

    pub fn put_at(&self, id: u64, item: Option<&Item>, fetched_at: DateTime<Utc>) -> Result<()> {
        let entry = CachedItem {
            item: item.cloned(),
            fetched_at,
        };
        self.store.set(&id.to_string(), &serde_json::to_string(&entry)?)
    }

    pub fn len(&self) -> Result<usize> {
        self.store.len()
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.store.is_empty()
    }
}
