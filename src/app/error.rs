use std::path::PathBuf;

use thiserror::Error;

use crate::domain::Source;

#[derive(Error, Debug)]
pub enum FreshetError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parsing error: {0}")]
    FeedParse(String),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Failed to save sources to {}: {source}", path.display())]
    Save {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, FreshetError>;

/// Reading the source list stopped early.
///
/// `partial` holds every record decoded before the failure, in file order.
/// Whether to continue with it is up to the caller.
#[derive(Error, Debug)]
#[error("Failed to load sources from {}: {reason}", path.display())]
pub struct LoadError {
    pub path: PathBuf,
    #[source]
    pub reason: LoadFailure,
    pub partial: Vec<Source>,
}

#[derive(Error, Debug)]
pub enum LoadFailure {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt record at line {line}: {source}")]
    Corrupt {
        line: usize,
        source: serde_json::Error,
    },
}
