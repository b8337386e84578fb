//! # Tangerine
//!
//! A terminal reader for Hacker News.
//!
//! ## Architecture
//!
//! ```text
//! Fetcher → Cache → Refresh / Thread → Selection → UI
//! ```
//!
//! - [`fetcher`]: HTTP client for the public Hacker News API
//! - [`cache`]: Session item cache with per-read freshness
//! - [`refresh`]: Story list refresh, timer and in-flight gate
//! - [`thread`]: Lazily loaded, batched comment tree
//! - [`tui`]: Terminal user interface built with ratatui
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the TUI
//! tangerine
//!
//! # Print the Ask HN list
//! tangerine list --type ask
//!
//! # Print a story with every comment
//! tangerine show 8863 --all
//!
//! # Open the TUI with a story highlighted
//! tangerine --item "https://news.ycombinator.com/item?id=8863"
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the fetcher,
/// the session cache and the persisted preferences.
pub mod app;

/// Session cache of fetched items.
///
/// - [`Freshness`](cache::Freshness): how old a cached entry may be
/// - [`ItemCache`](cache::ItemCache): JSON entries with a fetch timestamp
/// - [`ItemLoader`](cache::loader::ItemLoader): cache-first item reads
pub mod cache;

/// Command-line interface using clap.
///
/// - `tui` - Launch the TUI (default)
/// - `list [--type] [--limit]` - Print a story list
/// - `show <id> [--all]` - Print a story and its comments
pub mod cli;

/// Configuration management.
///
/// Loads from `~/.config/tangerine/config.toml`, supporting:
/// - API and refresh settings
/// - Custom colors (named or hex)
/// - Custom keybindings
pub mod config;

/// Core domain models.
///
/// - [`Item`](domain::Item): Stories, comments and jobs as served by the API
/// - [`StoryType`](domain::StoryType): The story lists (top, new, best, ...)
pub mod domain;

/// HTTP fetching.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for list and item reads
/// - [`HttpFetcher`](fetcher::http_fetcher::HttpFetcher): reqwest-based implementation
/// - [`ParallelFetcher`](fetcher::parallel::ParallelFetcher): Concurrent item reads with semaphore
pub mod fetcher;

pub mod refresh;

/// Display text: headers, bylines, relative times and HTML stripping.
pub mod render;

pub mod selection;

/// Key-value stores.
///
/// - [`SqliteStore`](store::SqliteStore): Preferences that survive restarts
/// - [`MemoryStore`](store::MemoryStore): Per-session storage
/// - [`Preferences`](store::Preferences): Typed access to the saved story type and highlight
pub mod store;

pub mod thread;

/// Terminal user interface.
///
/// Three-pane layout built with ratatui:
/// - Story types (tabs)
/// - Stories (40% height)
/// - Story header and comments (remaining)
///
/// Keybindings: j/k navigate, h/l switch story type, Tab cycles panes,
/// Enter selects or expands, L loads more comments, o opens in browser,
/// s/u search other discussions by host or URL, R refreshes, m maximizes the
/// comments, q quits.
pub mod tui;
