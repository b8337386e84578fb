//! API and reader behaviour settings.

use std::time::Duration;

use serde::{de, Deserialize, Deserializer};

use crate::domain::StoryType;
use crate::fetcher::http_fetcher::DEFAULT_API_ROOT;
use crate::fetcher::parallel::DEFAULT_WORKERS;
use crate::refresh::{DEFAULT_REFRESH_INTERVAL, DEFAULT_STORY_LIMIT};
use crate::thread::DEFAULT_BATCH_SIZE;

pub const DEFAULT_COMMENT_MAX_AGE: Duration = Duration::from_secs(2 * 60 * 60);

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HnConfig {
    pub api_root: String,
    /// Story type used until one has been picked.
    pub story_type: StoryType,
    pub story_limit: usize,
    #[serde(deserialize_with = "deserialize_interval")]
    pub refresh_interval: Duration,
    pub batch_size: usize,
    /// Cached comments older than this are fetched again.
    #[serde(deserialize_with = "deserialize_interval")]
    pub comment_max_age: Duration,
    pub workers: usize,
}

impl Default for HnConfig {
    fn default() -> Self {
        Self {
            api_root: DEFAULT_API_ROOT.to_string(),
            story_type: StoryType::Top,
            story_limit: DEFAULT_STORY_LIMIT,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            batch_size: DEFAULT_BATCH_SIZE,
            comment_max_age: DEFAULT_COMMENT_MAX_AGE,
            workers: DEFAULT_WORKERS,
        }
    }
}

fn deserialize_interval<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_interval(&s).map_err(de::Error::custom)
}

/// Parse interval string like "90s", "1m", "2h", "1d" or plain seconds.
pub fn parse_interval(s: &str) -> Result<Duration, String> {
    let s = s.trim().to_lowercase();

    let secs = if let Some(hours) = s.strip_suffix('h') {
        hours
            .parse::<u64>()
            .map(|h| h * 3600)
            .map_err(|_| format!("Invalid hours: {}", hours))
    } else if let Some(minutes) = s.strip_suffix('m') {
        minutes
            .parse::<u64>()
            .map(|m| m * 60)
            .map_err(|_| format!("Invalid minutes: {}", minutes))
    } else if let Some(days) = s.strip_suffix('d') {
        days.parse::<u64>()
            .map(|d| d * 86400)
            .map_err(|_| format!("Invalid days: {}", days))
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.parse::<u64>()
            .map_err(|_| format!("Invalid seconds: {}", secs))
    } else {
        s.parse::<u64>()
            .map_err(|_| format!("Invalid interval: {}. Use format like '60s', '1m', '2h'", s))
    }?;

    if secs == 0 {
        return Err("Interval must be greater than zero".to_string());
    }
    Ok(Duration::from_secs(secs))
}

/// Format interval for display
pub fn format_interval(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 86400 && secs.is_multiple_of(86400) {
        format!("{}d", secs / 86400)
    } else if secs >= 3600 && secs.is_multiple_of(3600) {
        format!("{}h", secs / 3600)
    } else if secs >= 60 && secs.is_multiple_of(60) {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}
