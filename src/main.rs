use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tangerine::app::AppContext;
use tangerine::cli::{commands, Cli, Commands};
use tangerine::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(matches!(cli.command, None | Some(Commands::Tui)));

    let mut config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
            Config::default()
        }
    };
    if let Some(interval) = cli.refresh {
        config.hn.refresh_interval = interval;
    }
    if let Some(workers) = cli.workers {
        config.hn.workers = workers;
    }

    let ctx = AppContext::new(None, config.hn.clone())?;
    if let Some(id) = cli.item {
        ctx.prefs.set_highlight(id)?;
    }

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            tangerine::tui::run(Arc::new(ctx), Arc::new(config)).await?;
        }
        Commands::List { story_type, limit } => {
            let story_type = match story_type {
                Some(t) => t,
                None => ctx.story_type()?,
            };
            let limit = limit.unwrap_or(ctx.hn.story_limit);
            commands::list_stories(&ctx, story_type, limit).await?;
        }
        Commands::Show { id, all } => {
            commands::show_item(&ctx, id, all).await?;
        }
    }

    Ok(())
}

/// The TUI owns the terminal, so its logs go to a file. Printing commands log
/// to stderr, away from their stdout output.
fn init_logging(tui: bool) {
    if !tui {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(EnvFilter::from_default_env())
            .init();
        return;
    }

    match log_file() {
        Ok(file) => tracing_subscriber::registry()
            .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
            .with(EnvFilter::from_default_env())
            .init(),
        Err(e) => eprintln!("Warning: {:#}. Logging disabled.", e),
    }
}

fn log_file() -> anyhow::Result<File> {
    let dir = dirs::data_dir().context("Could not find data directory")?;
    open_log(&dir.join("tangerine"))
}

/// Open `tangerine.log` in `dir` for appending, creating both as needed.
fn open_log(dir: &Path) -> anyhow::Result<File> {
    fs::create_dir_all(dir).with_context(|| format!("Could not create {}", dir.display()))?;

    let path = dir.join("tangerine.log");
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Could not open {}", path.display()))
}
