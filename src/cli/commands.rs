use chrono::{DateTime, Utc};

use crate::app::{AppContext, Result};
use crate::domain::StoryType;
use crate::render::{self, Header};
use crate::thread::Thread;

pub async fn list_stories(ctx: &AppContext, story_type: StoryType, limit: usize) -> Result<()> {
    let highlight = ctx.prefs.highlight()?;
    let list = crate::refresh::refresh_story_list(
        ctx.fetcher.as_ref(),
        &ctx.parallel_fetcher,
        story_type,
        limit,
        highlight,
    )
    .await?;

    if list.rows.is_empty() {
        println!("No stories");
        return Ok(());
    }

    println!("{} stories", story_type);
    for (i, row) in list.rows.iter().enumerate() {
        let marker = if row.highlighted { "●" } else { " " };
        let header = Header::new(&row.item);
        let host = header
            .host
            .map(|h| format!(" ({})", h))
            .unwrap_or_default();

        println!("{} {:>3}. {}{}", marker, i + 1, header.title, host);
        println!(
            "       {} points by {} | {} comments | {}",
            row.item.score.unwrap_or(0),
            row.item.author(),
            header.comments,
            row.id()
        );
    }

    Ok(())
}

/// Print a story and its first batch of comments, or everything with `all`.
pub async fn show_item(ctx: &AppContext, id: u64, all: bool) -> Result<()> {
    let mut thread = ctx.open_thread(id).await?;
    let freshness = ctx.comment_freshness();

    if all {
        thread.expand_all(&ctx.parallel_fetcher, freshness).await?;
    } else {
        thread.load_more(&ctx.parallel_fetcher, freshness).await?;
    }

    for line in thread_lines(&thread, Utc::now()) {
        println!("{}", line);
    }

    if thread.has_more() {
        println!(
            "{} more comments not shown, use --all to load them",
            thread.remaining()
        );
    }

    Ok(())
}

fn thread_lines(thread: &Thread, now: DateTime<Utc>) -> Vec<String> {
    let header = Header::new(thread.root());
    let mut lines = vec![header.title.clone(), header.link.clone()];

    if let (Some(host), Some(search)) = (&header.host, &header.host_search) {
        lines.push(format!("{} | {}", host, search));
    }
    if let Some(search) = &header.url_search {
        lines.push(format!("url | {}", search));
    }
    lines.push(format!("{} comments | {}", header.comments, header.permalink));

    if let Some(text) = &header.text {
        lines.push(String::new());
        lines.extend(text.lines().map(str::to_string));
        if let Some(byline) = &header.byline {
            lines.push(byline.clone());
        }
    }

    for row in thread.visible_nodes() {
        let indent = "  ".repeat(row.depth);
        let node = row.node;

        lines.push(String::new());
        lines.push(format!(
            "{}{}",
            indent,
            render::byline(&node.item, node.is_op, now)
        ));
        if let Some(text) = node.item.text.as_deref() {
            for text_line in render::strip_html(text).lines() {
                lines.push(format!("{}  {}", indent, text_line));
            }
        }
        if !node.is_leaf() && !node.expanded {
            lines.push(format!("{}  [+{} replies]", indent, node.item.kids().len()));
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Freshness;
    use crate::config::HnConfig;
    use crate::fetcher::mock::{comment, story, MockFetcher};
    use crate::store::SqliteStore;
    use std::sync::Arc;

    #[test]
    fn test_thread_lines_list_search_links() {
        let mut root = story(1, "Launch", "pg", vec![]);
        root.url = Some("https://example.com/post".into());
        let lines = thread_lines(&Thread::new(root, 10), Utc::now());

        assert_eq!(lines[1], "https://example.com/post");
        assert_eq!(lines[2], "example.com | https://hn.algolia.com/?q=example.com");
        assert_eq!(
            lines[3],
            "url | https://hn.algolia.com/?q=https%3A%2F%2Fexample.com%2Fpost"
        );
    }

    #[tokio::test]
    async fn test_thread_lines_indent_replies() {
        let fetcher = Arc::new(MockFetcher::with_items([
            story(1, "Launch", "pg", vec![10, 11]),
            comment(10, "pg", "Thanks<p>Second", vec![20]),
            comment(11, "sama", "Nice", vec![]),
            comment(20, "tptacek", "Reply", vec![]),
        ]));
        let ctx = AppContext::with_parts(
            fetcher,
            Arc::new(SqliteStore::in_memory().unwrap()),
            HnConfig::default(),
        );

        let mut thread = ctx.open_thread(1).await.unwrap();
        thread
            .load_more(&ctx.parallel_fetcher, Freshness::Any)
            .await
            .unwrap();
        let now = Utc::now();

        let lines = thread_lines(&thread, now);
        assert_eq!(lines[0], "Launch");
        assert!(lines.contains(&"pg [OP]".to_string()));
        assert!(lines.contains(&"  Thanks".to_string()));
        assert!(lines.contains(&"  Second".to_string()));
        assert!(lines.contains(&"  [+1 replies]".to_string()));

        thread
            .expand(10, &ctx.parallel_fetcher, Freshness::Any)
            .await
            .unwrap();
        let lines = thread_lines(&thread, now);
        assert!(lines.contains(&"  tptacek".to_string()));
        assert!(lines.contains(&"    Reply".to_string()));
    }
}
