pub mod app;
pub mod event;
pub mod layout;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{self, UnboundedSender};

use crate::app::{AppContext, AppError, Result};
use crate::config::hn::format_interval;
use crate::config::Config;
use crate::refresh::RefreshTimer;
use crate::render::Header;
use crate::selection::Effect;
use crate::thread::Thread;

use self::app::{ActivePane, CommentRow, TuiApp};
use self::event::{Action, AppEvent, EventHandler, Message};

type Tui = Terminal<CrosstermBackend<Stdout>>;

pub async fn run(ctx: Arc<AppContext>, config: Arc<Config>) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, ctx, config).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Owns the UI state. Network work runs in spawned tasks whose results
/// come back as [`Message`]s.
struct Runner {
    ctx: Arc<AppContext>,
    tx: UnboundedSender<Message>,
    timer: RefreshTimer,
}

async fn run_app(terminal: &mut Tui, ctx: Arc<AppContext>, config: Arc<Config>) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut tui_app = TuiApp::new();
    let event_handler = EventHandler::new(Duration::from_millis(100));

    let runner = Runner::new(ctx, tx);

    // Startup: load the persisted story type, then the highlighted story's comments
    let story_type = runner.ctx.story_type()?;
    let effects = tui_app.select_story_type(story_type);
    runner.apply(&mut tui_app, effects);
    if let Some(id) = runner.ctx.prefs.highlight()? {
        let effects = tui_app.select_story_id(id);
        runner.apply(&mut tui_app, effects);
    }

    loop {
        terminal.draw(|frame| layout::render(frame, &mut tui_app, &config.colors))?;

        match event_handler.next()? {
            AppEvent::Key(key) => {
                tui_app.clear_status();
                let action = config.keybindings.get_action(&key);
                runner.handle_action(&mut tui_app, action);
            }
            AppEvent::Tick => {}
        }

        while let Ok(message) = rx.try_recv() {
            runner.handle_message(&mut tui_app, message);
        }

        if tui_app.should_quit {
            break;
        }
    }

    runner.timer.stop();
    Ok(())
}

impl Runner {
    fn new(ctx: Arc<AppContext>, tx: UnboundedSender<Message>) -> Self {
        let timer_tx = tx.clone();
        let timer = RefreshTimer::start(ctx.hn.refresh_interval, move || {
            let _ = timer_tx.send(Message::RefreshDue);
        });
        tracing::info!(
            "Refreshing stories every {}",
            format_interval(ctx.hn.refresh_interval)
        );
        Self { ctx, tx, timer }
    }

    fn handle_action(&self, tui_app: &mut TuiApp, action: Action) {
        match action {
            Action::Quit => {
                tui_app.should_quit = true;
            }
            Action::MoveUp => {
                tui_app.move_up();
            }
            Action::MoveDown => {
                tui_app.move_down();
            }
            Action::NextPage => {
                tui_app.next_page();
            }
            Action::PrevPage => {
                tui_app.prev_page();
            }
            Action::NextPane => {
                tui_app.active_pane = tui_app.active_pane.next();
            }
            Action::PrevPane => {
                tui_app.active_pane = tui_app.active_pane.prev();
            }
            Action::NextStoryType => {
                let effects = tui_app.select_story_type(tui_app.story_type().next());
                self.apply(tui_app, effects);
            }
            Action::PrevStoryType => {
                let effects = tui_app.select_story_type(tui_app.story_type().prev());
                self.apply(tui_app, effects);
            }
            Action::Select => match tui_app.active_pane {
                ActivePane::StoryTypes => {
                    let effects = tui_app.select_story_type(tui_app.cursor_story_type());
                    self.apply(tui_app, effects);
                }
                ActivePane::Stories => {
                    let effects = tui_app.select_story();
                    self.apply(tui_app, effects);
                }
                ActivePane::Comments => match tui_app.selected_comment_row() {
                    Some(CommentRow::Comment { id, .. }) => self.toggle_comment(tui_app, id),
                    Some(CommentRow::LoadMore(_)) => self.load_more(tui_app),
                    None => {}
                },
            },
            Action::LoadMore => {
                self.load_more(tui_app);
            }
            Action::ExpandAll => {
                self.expand_all(tui_app);
            }
            Action::OpenLink => {
                let link = tui_app.selected_item().map(|item| item.link());
                open_in_browser(tui_app, link);
            }
            Action::OpenDiscussion => {
                let link = tui_app.selected_item().map(|item| item.permalink());
                open_in_browser(tui_app, link);
            }
            Action::SearchHost => {
                let link = tui_app
                    .selected_item()
                    .and_then(|item| Header::new(item).host_search);
                open_in_browser(tui_app, link);
            }
            Action::SearchUrl => {
                let link = tui_app
                    .selected_item()
                    .and_then(|item| Header::new(item).url_search);
                open_in_browser(tui_app, link);
            }
            Action::Refresh => {
                self.refresh(tui_app, false);
            }
            Action::ToggleMaximize => {
                let effects = tui_app.toggle_maximize();
                if effects.is_empty() && !tui_app.maximized {
                    tui_app.set_status("Select a story first".to_string());
                }
                self.apply(tui_app, effects);
            }
            Action::None => {}
        }
    }

    fn apply(&self, tui_app: &mut TuiApp, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::PersistStoryType(story_type) => {
                    if let Err(e) = self.ctx.prefs.set_story_type(story_type) {
                        report(tui_app, "Failed to save story type", &e);
                    }
                }
                Effect::PersistHighlight(id) => {
                    if let Err(e) = self.ctx.prefs.set_highlight(id) {
                        report(tui_app, "Failed to save highlight", &e);
                    }
                }
                Effect::RefreshList => self.refresh(tui_app, false),
                Effect::LoadComments(id) => self.open_thread(tui_app, id),
                Effect::PauseRefresh => self.timer.pause(),
                Effect::ResumeRefresh => self.timer.resume(),
            }
        }
    }

    /// Start a story list refresh. Scheduled refreshes are skipped while
    /// another one is running, manual ones supersede it.
    fn refresh(&self, tui_app: &mut TuiApp, scheduled: bool) {
        let generation = if scheduled {
            match tui_app.refresh_gate.try_begin() {
                Some(generation) => generation,
                None => {
                    tracing::debug!("Refresh still in flight, skipping tick");
                    return;
                }
            }
        } else {
            tui_app.refresh_gate.begin()
        };

        let story_type = tui_app.story_type();
        let ctx = self.ctx.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = ctx.refresh_stories(story_type).await;
            let _ = tx.send(Message::StoriesLoaded { generation, result });
        });
    }

    /// Fetch the story and its first batch of comments.
    fn open_thread(&self, tui_app: &mut TuiApp, id: u64) {
        let generation = tui_app.begin_thread();
        let ctx = self.ctx.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = async {
                let mut thread = ctx.open_thread(id).await?;
                thread
                    .load_more(&ctx.parallel_fetcher, ctx.comment_freshness())
                    .await?;
                Ok::<Thread, AppError>(thread)
            }
            .await;
            let _ = tx.send(Message::ThreadOpened { generation, result });
        });
    }

    fn load_more(&self, tui_app: &mut TuiApp) {
        if tui_app.loading_comments {
            return;
        }
        let Some(thread) = &tui_app.thread else {
            return;
        };
        let ids = thread.next_batch_ids();
        if ids.is_empty() {
            return;
        }

        tui_app.loading_comments = true;
        let generation = tui_app.thread_generation();
        let ctx = self.ctx.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = ctx
                .parallel_fetcher
                .fetch_all(&ids, ctx.comment_freshness())
                .await;
            let _ = tx.send(Message::BatchLoaded { generation, result });
        });
    }

    fn toggle_comment(&self, tui_app: &mut TuiApp, id: u64) {
        // The thread is about to be replaced by the batch or expand-all result
        if tui_app.loading_comments {
            tui_app.set_status("Still loading comments".to_string());
            return;
        }
        let Some(thread) = tui_app.thread.as_mut() else {
            return;
        };
        let to_fetch = thread.toggle(id);
        tui_app.clamp_comment_index();

        let Some(kids) = to_fetch else {
            return;
        };
        let generation = tui_app.thread_generation();
        let ctx = self.ctx.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = ctx
                .parallel_fetcher
                .fetch_all(&kids, ctx.comment_freshness())
                .await;
            let _ = tx.send(Message::RepliesLoaded {
                generation,
                parent: id,
                result,
            });
        });
    }

    fn expand_all(&self, tui_app: &mut TuiApp) {
        if tui_app.loading_comments {
            return;
        }
        let Some(thread) = &tui_app.thread else {
            return;
        };

        let mut thread = thread.clone();
        tui_app.loading_comments = true;
        let generation = tui_app.thread_generation();
        let ctx = self.ctx.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = thread
                .expand_all(&ctx.parallel_fetcher, ctx.comment_freshness())
                .await
                .map(|_| thread);
            let _ = tx.send(Message::ThreadExpanded { generation, result });
        });
    }

    fn handle_message(&self, tui_app: &mut TuiApp, message: Message) {
        match message {
            Message::RefreshDue => self.refresh(tui_app, true),
            Message::StoriesLoaded { generation, result } => {
                if !tui_app.refresh_gate.finish(generation) {
                    return;
                }
                match result {
                    Ok(list) => {
                        tracing::info!("Loaded {} {} stories", list.rows.len(), list.story_type);
                        tui_app.apply_stories(list);
                    }
                    Err(e) => report(tui_app, "Refresh failed", &e),
                }
            }
            Message::ThreadOpened { generation, result } => {
                if !tui_app.is_current_thread(generation) {
                    return;
                }
                tui_app.loading_thread = false;
                match result {
                    Ok(thread) => tui_app.thread = Some(thread),
                    Err(AppError::ItemNotFound(id)) => self.forget_highlight(tui_app, id),
                    Err(e) => report(tui_app, "Failed to load story", &e),
                }
            }
            Message::BatchLoaded { generation, result } => {
                if !tui_app.is_current_thread(generation) {
                    return;
                }
                tui_app.loading_comments = false;
                match result {
                    Ok(items) => {
                        if let Some(thread) = tui_app.thread.as_mut() {
                            thread.append_batch(items);
                        }
                    }
                    Err(e) => report(tui_app, "Failed to load comments", &e),
                }
            }
            Message::RepliesLoaded {
                generation,
                parent,
                result,
            } => {
                if !tui_app.is_current_thread(generation) {
                    return;
                }
                let Some(thread) = tui_app.thread.as_mut() else {
                    return;
                };
                match result {
                    Ok(items) => {
                        thread.finish_expand(parent, items);
                    }
                    Err(e) => {
                        thread.abort_expand(parent);
                        report(tui_app, "Failed to load replies", &e);
                    }
                }
                tui_app.clamp_comment_index();
            }
            Message::ThreadExpanded { generation, result } => {
                if !tui_app.is_current_thread(generation) {
                    return;
                }
                tui_app.loading_comments = false;
                match result {
                    Ok(thread) => tui_app.thread = Some(thread),
                    Err(e) => report(tui_app, "Failed to expand comments", &e),
                }
            }
        }
    }

    /// Stop restoring a story the API no longer serves.
    fn forget_highlight(&self, tui_app: &mut TuiApp, id: u64) {
        tui_app.set_status(format!("Story {} no longer exists", id));
        match self.ctx.prefs.highlight() {
            Ok(Some(current)) if current == id => {
                if let Err(e) = self.ctx.prefs.clear_highlight() {
                    report(tui_app, "Failed to clear highlight", &e);
                }
            }
            Ok(_) => {}
            Err(e) => report(tui_app, "Failed to read highlight", &e),
        }
    }
}

fn report(tui_app: &mut TuiApp, context: &str, error: &dyn std::fmt::Display) {
    tracing::warn!("{}: {}", context, error);
    tui_app.set_status(format!("{}: {}", context, error));
}

fn open_in_browser(tui_app: &mut TuiApp, link: Option<String>) {
    let Some(link) = link else {
        return;
    };
    if let Err(e) = open::that(&link) {
        report(tui_app, "Failed to open browser", &e);
    }
}
