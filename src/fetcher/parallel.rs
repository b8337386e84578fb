use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;

use crate::app::{AppError, Result};
use crate::cache::{Freshness, ItemLoader};
use crate::domain::Item;

pub const DEFAULT_WORKERS: usize = 10;

/// Resolves many item IDs at once, bounded by a fixed number of in-flight
/// requests.
#[derive(Clone)]
pub struct ParallelFetcher {
    loader: ItemLoader,
    semaphore: Arc<Semaphore>,
}

impl ParallelFetcher {
    pub fn new(loader: ItemLoader) -> Self {
        Self::with_workers(loader, DEFAULT_WORKERS)
    }

    pub fn with_workers(loader: ItemLoader, workers: usize) -> Self {
        Self {
            loader,
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    pub fn loader(&self) -> &ItemLoader {
        &self.loader
    }

    /// Resolve every ID and wait for all of them.
    ///
    /// Results are in input order. The first failure (in input order) fails
    /// the whole set.
    pub async fn fetch_all(&self, ids: &[u64], freshness: Freshness) -> Result<Vec<Option<Item>>> {
        let mut handles = Vec::with_capacity(ids.len());

        for &id in ids {
            let loader = self.loader.clone();
            let semaphore = self.semaphore.clone();

            handles.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| AppError::Other(format!("Fetch pool closed: {}", e)))?;
                loader.get_item(id, freshness).await
            }));
        }

        let mut items = Vec::with_capacity(handles.len());
        for joined in join_all(handles).await {
            match joined {
                Ok(result) => items.push(result?),
                Err(e) => {
                    tracing::error!("Task join error: {}", e);
                    return Err(AppError::Other(format!("Fetch task failed: {}", e)));
                }
            }
        }

        Ok(items)
    }
}
