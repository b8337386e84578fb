use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The story feeds offered by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryType {
    #[default]
    #[serde(alias = "topstories")]
    Top,
    #[serde(alias = "newstories")]
    New,
    #[serde(alias = "beststories")]
    Best,
    #[serde(alias = "askstories")]
    Ask,
    #[serde(alias = "showstories")]
    Show,
    #[serde(alias = "jobstories")]
    Job,
}

impl StoryType {
    pub const ALL: [StoryType; 6] = [
        StoryType::Top,
        StoryType::New,
        StoryType::Best,
        StoryType::Ask,
        StoryType::Show,
        StoryType::Job,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StoryType::Top => "top",
            StoryType::New => "new",
            StoryType::Best => "best",
            StoryType::Ask => "ask",
            StoryType::Show => "show",
            StoryType::Job => "job",
        }
    }

    /// Path segment of the story-list endpoint, e.g. `topstories`.
    pub fn endpoint(self) -> String {
        format!("{}stories", self.as_str())
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for StoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoryType {
    type Err = String;

    /// Accepts both `top` and the endpoint form `topstories`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        let name = s.strip_suffix("stories").unwrap_or(&s);
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == name)
            .ok_or_else(|| format!("Unknown story type: {}", s))
    }
}
