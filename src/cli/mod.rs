pub mod commands;

use std::time::Duration;

use clap::{Parser, Subcommand};
use url::Url;

use crate::config::hn::parse_interval;
use crate::domain::StoryType;

#[derive(Parser)]
#[command(name = "tangerine")]
#[command(about = "A terminal Hacker News reader", long_about = None)]
pub struct Cli {
    /// Story to highlight on start, as an ID or an item URL
    #[arg(long, global = true, value_parser = parse_item_ref)]
    pub item: Option<u64>,

    /// Story list refresh interval (e.g., "60s", "5m")
    #[arg(long, global = true, value_parser = parse_interval)]
    pub refresh: Option<Duration>,

    /// Number of parallel workers for fetching items
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the TUI
    Tui,
    /// Print a story list
    List {
        /// Story type (top, new, best, ask, show, job)
        #[arg(short = 't', long = "type")]
        story_type: Option<StoryType>,

        /// Number of stories to fetch
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Print a story and its comments
    Show {
        /// Item ID or URL
        #[arg(value_parser = parse_item_ref)]
        id: u64,

        /// Load every comment and the full reply tree
        #[arg(short, long)]
        all: bool,
    },
}

/// Parse an item reference: a bare ID, or a URL carrying it in an `id` or
/// `i` query parameter.
pub fn parse_item_ref(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if let Ok(id) = s.parse::<u64>() {
        return valid_id(id, s);
    }

    let url = Url::parse(s).map_err(|_| format!("Not an item ID or URL: {}", s))?;
    let value = url
        .query_pairs()
        .find(|(k, _)| k == "id" || k == "i")
        .map(|(_, v)| v.into_owned())
        .ok_or_else(|| format!("No item ID in URL: {}", s))?;

    let id = value
        .parse::<u64>()
        .map_err(|_| format!("Invalid item ID: {}", value))?;
    valid_id(id, s)
}

fn valid_id(id: u64, s: &str) -> Result<u64, String> {
    if id == 0 {
        Err(format!("Invalid item ID: {}", s))
    } else {
        Ok(id)
    }
}
