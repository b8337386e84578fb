use chrono::{DateTime, Utc};
use ratatui::widgets::ListState;

use crate::domain::{Item, StoryType};
use crate::refresh::{RefreshGate, StoryList, StoryRow};
use crate::selection::{Effect, HighlightGroup, SelectionState};
use crate::thread::Thread;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePane {
    StoryTypes,
    Stories,
    Comments,
}

impl ActivePane {
    pub fn next(self) -> Self {
        match self {
            ActivePane::StoryTypes => ActivePane::Stories,
            ActivePane::Stories => ActivePane::Comments,
            ActivePane::Comments => ActivePane::StoryTypes,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ActivePane::StoryTypes => ActivePane::Comments,
            ActivePane::Stories => ActivePane::StoryTypes,
            ActivePane::Comments => ActivePane::Stories,
        }
    }
}

pub const PAGE_SIZE: usize = 10;

/// A line of the comments pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentRow {
    Comment { id: u64, depth: usize },
    /// The "load more" control with the number of unrequested comments.
    LoadMore(usize),
}

pub struct TuiApp {
    pub active_pane: ActivePane,
    pub story_types: HighlightGroup<StoryType>,
    pub type_index: usize,
    pub stories: Vec<StoryRow>,
    pub stories_fetched_at: Option<DateTime<Utc>>,
    pub story_index: usize,
    pub thread: Option<Thread>,
    pub comment_index: usize,
    pub selection: SelectionState,
    pub refresh_gate: RefreshGate,
    thread_generation: u64,
    pub loading_thread: bool,
    pub loading_comments: bool,
    pub should_quit: bool,
    pub status_message: Option<String>,
    pub maximized: bool,
    // List states for scrolling
    pub story_list_state: ListState,
    pub comment_list_state: ListState,
}

impl TuiApp {
    pub fn new() -> Self {
        let mut story_list_state = ListState::default();
        story_list_state.select(Some(0));
        let mut comment_list_state = ListState::default();
        comment_list_state.select(Some(0));

        Self {
            active_pane: ActivePane::Stories,
            story_types: HighlightGroup::new(StoryType::ALL),
            type_index: 0,
            stories: Vec::new(),
            stories_fetched_at: None,
            story_index: 0,
            thread: None,
            comment_index: 0,
            selection: SelectionState::new(),
            refresh_gate: RefreshGate::new(),
            thread_generation: 0,
            loading_thread: false,
            loading_comments: false,
            should_quit: false,
            status_message: None,
            maximized: false,
            story_list_state,
            comment_list_state,
        }
    }

    pub fn story_type(&self) -> StoryType {
        self.story_types.highlighted().copied().unwrap_or_default()
    }

    /// The story type under the cursor in the story types pane.
    pub fn cursor_story_type(&self) -> StoryType {
        StoryType::ALL[self.type_index % StoryType::ALL.len()]
    }

    pub fn select_story_type(&mut self, story_type: StoryType) -> Vec<Effect> {
        self.story_types.highlight(&story_type);
        self.type_index = story_type.index();
        self.selection.select_story_type(story_type)
    }

    pub fn selected_story(&self) -> Option<&StoryRow> {
        self.stories.get(self.story_index)
    }

    /// Highlight the story under the cursor.
    pub fn select_story(&mut self) -> Vec<Effect> {
        match self.selected_story().map(StoryRow::id) {
            Some(id) => self.select_story_id(id),
            None => Vec::new(),
        }
    }

    pub fn select_story_id(&mut self, id: u64) -> Vec<Effect> {
        for row in &mut self.stories {
            row.highlighted = row.id() == id;
        }
        self.selection.select_item(id)
    }

    /// Replace the story list, keeping the cursor on the same story when it
    /// is still listed.
    pub fn apply_stories(&mut self, list: StoryList) {
        let current = self.selected_story().map(StoryRow::id);

        self.story_index = current
            .and_then(|id| list.rows.iter().position(|r| r.id() == id))
            .or_else(|| list.highlighted_index())
            .unwrap_or(0);
        self.stories = list.rows;
        self.stories_fetched_at = Some(list.fetched_at);
        self.story_list_state.select(Some(self.story_index));
    }

    /// Forget the current thread and return the generation for the next one.
    pub fn begin_thread(&mut self) -> u64 {
        self.thread_generation += 1;
        self.thread = None;
        self.loading_thread = true;
        self.loading_comments = false;
        self.comment_index = 0;
        self.comment_list_state.select(Some(0));
        self.thread_generation
    }

    pub fn thread_generation(&self) -> u64 {
        self.thread_generation
    }

    pub fn is_current_thread(&self, generation: u64) -> bool {
        generation == self.thread_generation
    }

    pub fn comment_rows(&self) -> Vec<CommentRow> {
        let Some(thread) = &self.thread else {
            return Vec::new();
        };

        let mut rows: Vec<CommentRow> = thread
            .visible_nodes()
            .iter()
            .map(|v| CommentRow::Comment {
                id: v.node.id(),
                depth: v.depth,
            })
            .collect();
        if thread.has_more() {
            rows.push(CommentRow::LoadMore(thread.remaining()));
        }
        rows
    }

    pub fn selected_comment_row(&self) -> Option<CommentRow> {
        self.comment_rows().get(self.comment_index).copied()
    }

    /// The item targeted by link actions in the active pane.
    pub fn selected_item(&self) -> Option<&Item> {
        match self.active_pane {
            ActivePane::StoryTypes => None,
            ActivePane::Stories => self.selected_story().map(|r| &r.item),
            ActivePane::Comments => {
                let thread = self.thread.as_ref()?;
                match self.selected_comment_row() {
                    Some(CommentRow::Comment { id, .. }) => thread.find(id).map(|n| &n.item),
                    _ => Some(thread.root()),
                }
            }
        }
    }

    fn comment_count(&self) -> usize {
        self.comment_rows().len()
    }

    fn set_comment_index(&mut self, index: usize) {
        self.comment_index = index;
        self.comment_list_state.select(Some(index));
    }

    fn set_story_index(&mut self, index: usize) {
        self.story_index = index;
        self.story_list_state.select(Some(index));
    }

    /// Keep the comment cursor inside the list after rows disappear.
    pub fn clamp_comment_index(&mut self) {
        let max_index = self.comment_count().saturating_sub(1);
        if self.comment_index > max_index {
            self.set_comment_index(max_index);
        }
    }

    pub fn move_up(&mut self) {
        match self.active_pane {
            ActivePane::StoryTypes => self.prev_story_type(),
            ActivePane::Stories => {
                if self.story_index > 0 {
                    self.set_story_index(self.story_index - 1);
                }
            }
            ActivePane::Comments => {
                if self.comment_index > 0 {
                    self.set_comment_index(self.comment_index - 1);
                }
            }
        }
    }

    pub fn move_down(&mut self) {
        match self.active_pane {
            ActivePane::StoryTypes => self.next_story_type(),
            ActivePane::Stories => {
                if self.story_index + 1 < self.stories.len() {
                    self.set_story_index(self.story_index + 1);
                }
            }
            ActivePane::Comments => {
                if self.comment_index + 1 < self.comment_count() {
                    self.set_comment_index(self.comment_index + 1);
                }
            }
        }
    }

    pub fn next_page(&mut self) {
        match self.active_pane {
            ActivePane::StoryTypes => {}
            ActivePane::Stories => {
                let max_index = self.stories.len().saturating_sub(1);
                self.set_story_index((self.story_index + PAGE_SIZE).min(max_index));
            }
            ActivePane::Comments => {
                let max_index = self.comment_count().saturating_sub(1);
                self.set_comment_index((self.comment_index + PAGE_SIZE).min(max_index));
            }
        }
    }

    pub fn prev_page(&mut self) {
        match self.active_pane {
            ActivePane::StoryTypes => {}
            ActivePane::Stories => {
                self.set_story_index(self.story_index.saturating_sub(PAGE_SIZE));
            }
            ActivePane::Comments => {
                self.set_comment_index(self.comment_index.saturating_sub(PAGE_SIZE));
            }
        }
    }

    pub fn next_story_type(&mut self) {
        self.type_index = self.cursor_story_type().next().index();
    }

    pub fn prev_story_type(&mut self) {
        self.type_index = self.cursor_story_type().prev().index();
    }

    /// Enter or leave the full-screen comments view.
    pub fn toggle_maximize(&mut self) -> Vec<Effect> {
        if self.maximized {
            self.maximized = false;
            self.selection.close_comments()
        } else {
            let effects = self.selection.open_comments();
            if self.selection.comments_open() {
                self.maximized = true;
                self.active_pane = ActivePane::Comments;
            }
            effects
        }
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }
}

impl Default for TuiApp {
    fn default() -> Self {
        Self::new()
    }
}
