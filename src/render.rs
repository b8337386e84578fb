//! Display text for stories and comments.

use chrono::{DateTime, Utc};

use crate::domain::Item;

/// Search index used for "other discussions" links.
pub const SEARCH_URL: &str = "https://hn.algolia.com/?q=";

pub fn search_link(query: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
    format!("{}{}", SEARCH_URL, encoded)
}

/// Everything shown above a story's comments.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub title: String,
    /// The story URL, or its discussion page when it has none.
    pub link: String,
    pub host: Option<String>,
    pub host_search: Option<String>,
    pub url_search: Option<String>,
    /// Comment count, or an em dash when there are none.
    pub comments: String,
    pub permalink: String,
    pub text: Option<String>,
    pub byline: Option<String>,
}

impl Header {
    pub fn new(item: &Item) -> Self {
        let host = item.hostname();
        let comments = match item.descendants {
            Some(n) if n > 0 => n.to_string(),
            _ => "—".to_string(),
        };
        let text = item.text.as_deref().map(strip_html);

        Self {
            title: item.display_title().to_string(),
            link: item.link(),
            host_search: host.as_deref().map(search_link),
            host,
            url_search: item.url.as_deref().map(search_link),
            comments,
            permalink: item.permalink(),
            byline: text.as_ref().map(|_| format!("[{}]", item.author())),
            text,
        }
    }
}

/// Author, age and OP marker of a comment.
pub fn byline(item: &Item, is_op: bool, now: DateTime<Utc>) -> String {
    let mut line = item.author().to_string();
    if is_op {
        line.push_str(" [OP]");
    }
    if let Some(posted) = item.posted_at() {
        line.push_str(" · ");
        line.push_str(&time_ago(posted, now));
    }
    line
}

pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = now.signed_duration_since(then).num_seconds().max(0);
    match secs {
        0..=59 => "just now".to_string(),
        60..=3599 => plural(secs / 60, "minute"),
        3600..=86399 => plural(secs / 3600, "hour"),
        _ => plural(secs / 86400, "day"),
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}

/// Turn the API's HTML fragments into plain text.
///
/// `<p>` starts a new paragraph, other tags are dropped and entities decoded.
pub fn strip_html(html: &str) -> String {
    let mut result = String::new();
    let mut tag = String::new();
    let mut in_tag = false;

    for c in html.chars() {
        match c {
            '<' => {
                in_tag = true;
                tag.clear();
            }
            '>' if in_tag => {
                in_tag = false;
                let name = tag
                    .trim_start_matches('/')
                    .split_whitespace()
                    .next()
                    .unwrap_or("")
                    .to_lowercase();
                if name == "p" && !tag.starts_with('/') && !result.is_empty() {
                    result.push_str("\n\n");
                }
            }
            _ if in_tag => tag.push(c),
            _ => result.push(c),
        }
    }

    html_escape::decode_html_entities(result.trim()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_header_for_link_story() {
        let item = Item {
            id: 8863,
            title: Some("My YC app".into()),
            url: Some("http://www.getdropbox.com/u/2/screencast.html".into()),
            descendants: Some(71),
            by: Some("dhouston".into()),
            ..Item::default()
        };
        let header = Header::new(&item);

        assert_eq!(header.title, "My YC app");
        assert_eq!(header.link, "http://www.getdropbox.com/u/2/screencast.html");
        assert_eq!(header.host.as_deref(), Some("www.getdropbox.com"));
        assert_eq!(
            header.host_search.as_deref(),
            Some("https://hn.algolia.com/?q=www.getdropbox.com")
        );
        assert_eq!(
            header.url_search.as_deref(),
            Some("https://hn.algolia.com/?q=http%3A%2F%2Fwww.getdropbox.com%2Fu%2F2%2Fscreencast.html")
        );
        assert_eq!(header.comments, "71");
        assert_eq!(header.permalink, "https://news.ycombinator.com/item?id=8863");
        assert_eq!(header.text, None);
    }

    #[test]
    fn test_header_for_text_story() {
        let item = Item {
            id: 121003,
            title: Some("Ask HN: The Arc Effect".into()),
            text: Some("<i>or</i> HN: the Next Iteration<p>I get the impression".into()),
            by: Some("tel".into()),
            ..Item::default()
        };
        let header = Header::new(&item);

        assert_eq!(header.link, "https://news.ycombinator.com/item?id=121003");
        assert_eq!(header.host, None);
        assert_eq!(header.url_search, None);
        assert_eq!(header.comments, "—");
        assert_eq!(
            header.text.as_deref(),
            Some("or HN: the Next Iteration\n\nI get the impression")
        );
        assert_eq!(header.byline.as_deref(), Some("[tel]"));
    }

    #[test]
    fn test_zero_descendants_shows_dash() {
        let item = Item {
            descendants: Some(0),
            ..Item::new(1)
        };
        assert_eq!(Header::new(&item).comments, "—");
    }

    #[test]
    fn test_strip_html_decodes_entities() {
        assert_eq!(
            strip_html("It&#x27;s <a href=\"https:&#x2F;&#x2F;x.org\">here</a> &amp; there"),
            "It's here & there"
        );
    }

    #[test]
    fn test_byline() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let item = Item {
            by: Some("pg".into()),
            time: Some((now - chrono::Duration::hours(3)).timestamp()),
            ..Item::new(1)
        };
        assert_eq!(byline(&item, true, now), "pg [OP] · 3 hours ago");
        assert_eq!(byline(&Item::new(2), false, now), "[deleted]");
    }

    #[test]
    fn test_time_ago_units() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        assert_eq!(time_ago(now, now), "just now");
        assert_eq!(time_ago(now - chrono::Duration::minutes(1), now), "1 minute ago");
        assert_eq!(time_ago(now - chrono::Duration::days(2), now), "2 days ago");
    }

    #[test]
    fn test_search_link_encodes_query() {
        assert_eq!(
            search_link("https://a.com/x?y=1"),
            "https://hn.algolia.com/?q=https%3A%2F%2Fa.com%2Fx%3Fy%3D1"
        );
    }
}
