use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::config::ColorConfig;
use crate::render::{self, Header};
use crate::thread::{Children, CommentNode};
use crate::tui::app::{ActivePane, CommentRow, TuiApp};

pub fn render(frame: &mut Frame, app: &mut TuiApp, colors: &ColorConfig) {
    if app.maximized {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(10),   // Comments (full height)
                Constraint::Length(1), // Status bar
            ])
            .split(frame.area());

        render_comments_pane(frame, app, chunks[0], colors);
        render_status_bar(frame, app, chunks[1], colors);
    } else {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),      // Story types
                Constraint::Percentage(40), // Stories
                Constraint::Min(10),        // Comments
                Constraint::Length(1),      // Status bar
            ])
            .split(frame.area());

        render_story_types(frame, app, chunks[0], colors);
        render_stories_pane(frame, app, chunks[1], colors);
        render_comments_pane(frame, app, chunks[2], colors);
        render_status_bar(frame, app, chunks[3], colors);
    }
}

fn border_style(app: &TuiApp, pane: ActivePane, colors: &ColorConfig) -> Style {
    if app.active_pane == pane {
        Style::default().fg(colors.active_border)
    } else {
        Style::default().fg(colors.inactive_border)
    }
}

fn selection_style(app: &TuiApp, pane: ActivePane, colors: &ColorConfig) -> Style {
    if app.active_pane == pane {
        Style::default()
            .bg(colors.selection_bg_active)
            .fg(colors.selection_fg_active)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .bg(colors.selection_bg_inactive)
            .fg(colors.selection_fg_inactive)
    }
}

fn render_story_types(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let mut spans = Vec::new();
    for (i, (story_type, highlighted)) in app.story_types.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" | "));
        }

        let mut style = Style::default();
        if highlighted {
            style = style
                .fg(colors.highlight)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        }
        if app.active_pane == ActivePane::StoryTypes && i == app.type_index {
            style = selection_style(app, ActivePane::StoryTypes, colors);
        }
        spans.push(Span::styled(format!(" {} ", story_type), style));
    }

    let block = Block::default()
        .title(" Hacker News ")
        .borders(Borders::ALL)
        .border_style(border_style(app, ActivePane::StoryTypes, colors));

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_stories_pane(frame: &mut Frame, app: &mut TuiApp, area: Rect, colors: &ColorConfig) {
    let items: Vec<ListItem> = app
        .stories
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let item = &row.item;
            let header = Header::new(item);

            let marker = if row.highlighted { "●" } else { " " };
            let title_style = if row.highlighted {
                Style::default()
                    .fg(colors.highlight)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let mut title = vec![
                Span::raw(format!("{} {:>2}. ", marker, i + 1)),
                Span::styled(header.title, title_style),
            ];
            if let Some(host) = header.host {
                title.push(Span::styled(
                    format!(" ({})", host),
                    Style::default().fg(colors.story_meta),
                ));
            }

            let meta = format!(
                "       {} points by {} | {} comments",
                item.score.unwrap_or(0),
                item.author(),
                header.comments
            );

            ListItem::new(Text::from(vec![
                Line::from(title),
                Line::from(Span::styled(meta, Style::default().fg(colors.story_meta))),
            ]))
        })
        .collect();

    let mut title = format!(
        " {} stories ({}) [{}/{}] ",
        app.story_type(),
        app.stories.len(),
        app.story_index + 1,
        app.stories.len().max(1)
    );
    if let Some(fetched_at) = app.stories_fetched_at {
        let local = fetched_at.with_timezone(&chrono::Local);
        title.push_str(&format!("updated {} ", local.format("%H:%M:%S")));
    }

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style(app, ActivePane::Stories, colors));

    let list = List::new(items)
        .block(block)
        .highlight_style(selection_style(app, ActivePane::Stories, colors))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.story_list_state);
}

fn render_comments_pane(frame: &mut Frame, app: &mut TuiApp, area: Rect, colors: &ColorConfig) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app, ActivePane::Comments, colors));

    let Some(thread) = &app.thread else {
        let message = if app.loading_thread {
            "Loading..."
        } else {
            "No story selected"
        };
        frame.render_widget(
            Paragraph::new(message).block(block.title(" Comments ")),
            area,
        );
        return;
    };

    let header = Header::new(thread.root());
    let block = block.title(format!(" {} [{}] ", header.title, header.comments));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let header_lines = header_lines(&header, colors);
    let header_height = (header_lines.len() as u16 + 1).min(inner.height / 3).max(1);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(header_height), Constraint::Min(1)])
        .split(inner);

    frame.render_widget(
        Paragraph::new(Text::from(header_lines)).wrap(Wrap { trim: false }),
        chunks[0],
    );

    let width = chunks[1].width.saturating_sub(2) as usize;
    let now = Utc::now();
    let items: Vec<ListItem> = app
        .comment_rows()
        .into_iter()
        .filter_map(|row| match row {
            CommentRow::Comment { id, depth } => thread
                .find(id)
                .map(|node| comment_item(node, depth, width, now, colors)),
            CommentRow::LoadMore(remaining) => Some(ListItem::new(Line::from(Span::styled(
                format!("Load more comments ({} remaining)", remaining),
                Style::default()
                    .fg(colors.load_more)
                    .add_modifier(Modifier::BOLD),
            )))),
        })
        .collect();

    let items = if items.is_empty() {
        vec![ListItem::new("No comments")]
    } else {
        items
    };

    let list = List::new(items)
        .highlight_style(selection_style(app, ActivePane::Comments, colors))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, chunks[1], &mut app.comment_list_state);
}

fn header_lines(header: &Header, colors: &ColorConfig) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        header.link.clone(),
        Style::default().fg(colors.link),
    ))];

    let mut meta = vec![Span::styled(
        format!("{} comments", header.comments),
        Style::default().fg(colors.story_meta),
    )];
    if let Some(host) = &header.host {
        meta.push(Span::styled(
            format!(" | {} (s: other discussions)", host),
            Style::default().fg(colors.story_meta),
        ));
    }
    if header.url_search.is_some() {
        meta.push(Span::styled(
            " | u: search this URL",
            Style::default().fg(colors.story_meta),
        ));
    }
    lines.push(Line::from(meta));

    if let Some(text) = &header.text {
        lines.push(Line::from(""));
        lines.extend(text.lines().map(|l| Line::from(l.to_string())));
        if let Some(byline) = &header.byline {
            lines.push(Line::from(Span::styled(
                byline.clone(),
                Style::default().fg(colors.comment_author),
            )));
        }
    }

    lines
}

fn comment_item(
    node: &CommentNode,
    depth: usize,
    width: usize,
    now: DateTime<Utc>,
    colors: &ColorConfig,
) -> ListItem<'static> {
    let indent = "  ".repeat(depth);
    let marker = match (&node.children, node.expanded) {
        (Children::Leaf, _) => " ",
        (Children::Loading, _) => "…",
        (_, true) => "▾",
        (_, false) => "▸",
    };

    let author_color = if node.is_op {
        colors.op_author
    } else {
        colors.comment_author
    };

    let mut byline = render::byline(&node.item, node.is_op, now);
    if !node.is_leaf() && !node.expanded {
        byline.push_str(&format!(" [+{}]", node.item.kids().len()));
    }

    let mut lines = vec![Line::from(vec![
        Span::raw(format!("{}{} ", indent, marker)),
        Span::styled(byline, Style::default().fg(author_color)),
    ])];

    let text = node
        .item
        .text
        .as_deref()
        .map(render::strip_html)
        .unwrap_or_default();
    let text_width = width.saturating_sub(indent.len() + 2).max(20);
    for paragraph in text.lines() {
        for wrapped in wrap(paragraph, text_width) {
            lines.push(Line::from(format!("{}  {}", indent, wrapped)));
        }
    }
    lines.push(Line::from(""));

    ListItem::new(Text::from(lines))
}

/// Greedy word wrap. Words longer than `width` get a line of their own.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn render_status_bar(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let status = if let Some(ref msg) = app.status_message {
        msg.clone()
    } else if app.refresh_gate.in_flight() {
        format!("Refreshing {} stories...", app.story_type())
    } else if app.loading_thread || app.loading_comments {
        "Loading comments...".to_string()
    } else if app.maximized {
        "j/k:Scroll  Enter:Expand  L:More  E:Expand all  o:Open  m:Exit maximize  q:Quit"
            .to_string()
    } else {
        "j/k:Nav  h/l:Type  Tab:Pane  Enter:Select  o:Open  c:Discuss  s/u:Search  R:Refresh  m:Max  q:Quit"
            .to_string()
    };

    let paragraph =
        Paragraph::new(status).style(Style::default().fg(colors.status_fg).bg(colors.status_bg));

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("a bb ccc dddd", 6), vec!["a bb", "ccc", "dddd"]);
        assert_eq!(wrap("", 10), vec![""]);
        assert_eq!(wrap("unbreakable", 4), vec!["unbreakable"]);
    }
}
