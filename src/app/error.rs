use thiserror::Error;

/// Every failure the reader surfaces, from the API, the preference store or the terminal.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("preference store: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("request to Hacker News failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered, but not with a 2xx.
    #[error("Hacker News answered {status} ({reason})")]
    HttpStatus { status: u16, reason: String },

    #[error("malformed item payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bad API url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),

    /// The API returned `null` for this id.
    #[error("no item with id {0}")]
    ItemNotFound(u64),

    #[error("config: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
