use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Permalink prefix for items on the discussion site.
pub const HN_ITEM_URL: &str = "https://news.ycombinator.com/item?id=";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Story,
    Comment,
    Job,
    Poll,
    Pollopt,
    #[serde(other)]
    Unknown,
}

/// A node of the Hacker News API: story, comment, job or poll.
///
/// Fields the API leaves out deserialize to their defaults, unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Item {
    pub id: u64,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ItemKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kids: Option<Vec<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descendants: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<u64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deleted: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub dead: bool,
}

impl Item {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Deleted or flagged items are never displayed.
    pub fn is_tombstone(&self) -> bool {
        self.deleted || self.dead
    }

    pub fn kids(&self) -> &[u64] {
        self.kids.as_deref().unwrap_or(&[])
    }

    pub fn has_kids(&self) -> bool {
        !self.kids().is_empty()
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("(untitled)")
    }

    pub fn author(&self) -> &str {
        self.by.as_deref().unwrap_or("[deleted]")
    }

    pub fn permalink(&self) -> String {
        format!("{}{}", HN_ITEM_URL, self.id)
    }

    /// Where the title points: the story's own URL, or its discussion page.
    pub fn link(&self) -> String {
        self.url.clone().unwrap_or_else(|| self.permalink())
    }

    pub fn hostname(&self) -> Option<String> {
        let url = Url::parse(self.url.as_deref()?).ok()?;
        url.host_str().map(String::from)
    }

    pub fn posted_at(&self) -> Option<DateTime<Utc>> {
        self.time.and_then(|t| DateTime::from_timestamp(t, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_story() {
        let json = r#"{
            "by": "dhouston",
            "descendants": 71,
            "id": 8863,
            "kids": [8952, 9224, 8917],
            "score": 111,
            "time": 1175714200,
            "title": "My YC app: Dropbox - Throw away your USB drive",
            "type": "story",
            "url": "http://www.getdropbox.com/u/2/screencast.html"
        }"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, 8863);
        assert_eq!(item.kind, Some(ItemKind::Story));
        assert_eq!(item.kids(), &[8952, 9224, 8917]);
        assert_eq!(item.descendants, Some(71));
        assert!(!item.is_tombstone());
    }

    #[test]
    fn test_deserialize_tombstones() {
        let deleted: Item = serde_json::from_str(r#"{"id": 1, "deleted": true}"#).unwrap();
        let dead: Item = serde_json::from_str(r#"{"id": 2, "dead": true, "by": "x"}"#).unwrap();
        assert!(deleted.is_tombstone());
        assert!(dead.is_tombstone());
    }

    #[test]
    fn test_unknown_type_and_fields() {
        let item: Item =
            serde_json::from_str(r#"{"id": 3, "type": "something", "extra": [1, 2]}"#).unwrap();
        assert_eq!(item.kind, Some(ItemKind::Unknown));
    }

    #[test]
    fn test_null_body_is_none() {
        let item: Option<Item> = serde_json::from_str("null").unwrap();
        assert!(item.is_none());
    }

    #[test]
    fn test_link_falls_back_to_permalink() {
        let mut item = Item::new(42);
        assert_eq!(item.link(), "https://news.ycombinator.com/item?id=42");
        assert_eq!(item.hostname(), None);

        item.url = Some("https://blog.rust-lang.org/2024/01/01/post.html".into());
        assert_eq!(item.link(), "https://blog.rust-lang.org/2024/01/01/post.html");
        assert_eq!(item.hostname().as_deref(), Some("blog.rust-lang.org"));
    }

    #[test]
    fn test_display_fallbacks() {
        let item = Item::new(7);
        assert_eq!(item.display_title(), "(untitled)");
        assert_eq!(item.author(), "[deleted]");
        assert!(!item.has_kids());
    }
}
