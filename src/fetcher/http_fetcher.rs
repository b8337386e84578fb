use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use url::Url;

use crate::app::{AppError, Result};
use crate::domain::{Item, StoryType};
use crate::fetcher::Fetcher;

pub const DEFAULT_API_ROOT: &str = "https://hacker-news.firebaseio.com/v0";

pub struct HttpFetcher {
    client: Client,
    api_root: Url,
}

impl HttpFetcher {
    pub fn new(api_root: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("tangerine/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_root: Self::normalize_root(api_root)?,
        })
    }

    /// Joined paths replace the last segment unless the root ends with a slash.
    fn normalize_root(api_root: &str) -> Result<Url> {
        let trimmed = api_root.trim().trim_end_matches('/');
        Ok(Url::parse(&format!("{}/", trimmed))?)
    }

    pub fn story_ids_url(&self, story_type: StoryType, limit: usize) -> Result<Url> {
        let mut url = self
            .api_root
            .join(&format!("{}.json", story_type.endpoint()))?;
        url.query_pairs_mut()
            .append_pair("limitToFirst", &limit.to_string())
            .append_pair("orderBy", "\"$priority\"");
        Ok(url)
    }

    pub fn item_url(&self, id: u64) -> Result<Url> {
        Ok(self.api_root.join(&format!("item/{}.json", id))?)
    }

    async fn get(&self, url: Url) -> Result<Vec<u8>> {
        tracing::trace!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let response = check_status(response)?;
        Ok(response.bytes().await?.to_vec())
    }
}

/// Anything outside 200-299 becomes an error carrying the status text.
fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    Err(AppError::HttpStatus {
        status: status.as_u16(),
        reason: status
            .canonical_reason()
            .unwrap_or("Unknown status")
            .to_string(),
    })
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_story_ids(&self, story_type: StoryType, limit: usize) -> Result<Vec<u64>> {
        let body = self.get(self.story_ids_url(story_type, limit)?).await?;
        let ids: Option<Vec<u64>> = serde_json::from_slice(&body)?;
        Ok(ids.unwrap_or_default())
    }

    async fn fetch_item(&self, id: u64) -> Result<Option<Item>> {
        let body = self.get(self.item_url(id)?).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
