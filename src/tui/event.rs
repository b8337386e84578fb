use crossterm::event::{self, Event, KeyEvent};
use std::time::Duration;

use crate::app::Result;
use crate::domain::Item;
use crate::refresh::StoryList;
use crate::thread::Thread;

pub enum AppEvent {
    Key(KeyEvent),
    Tick,
}

pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    pub fn next(&self) -> Result<AppEvent> {
        if event::poll(self.tick_rate)? {
            if let Event::Key(key) = event::read()? {
                return Ok(AppEvent::Key(key));
            }
        }
        Ok(AppEvent::Tick)
    }
}

/// Results of background work, tagged with the generation they were started in.
pub enum Message {
    RefreshDue,
    StoriesLoaded {
        generation: u64,
        result: Result<StoryList>,
    },
    ThreadOpened {
        generation: u64,
        result: Result<Thread>,
    },
    BatchLoaded {
        generation: u64,
        result: Result<Vec<Option<Item>>>,
    },
    RepliesLoaded {
        generation: u64,
        parent: u64,
        result: Result<Vec<Option<Item>>>,
    },
    ThreadExpanded {
        generation: u64,
        result: Result<Thread>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    MoveUp,
    MoveDown,
    NextPage,
    PrevPage,
    NextPane,
    PrevPane,
    Select,
    NextStoryType,
    PrevStoryType,
    LoadMore,
    ExpandAll,
    OpenLink,
    OpenDiscussion,
    SearchHost,
    SearchUrl,
    Refresh,
    ToggleMaximize,
    None,
}
