//! Error types for the full-text search layer

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Reserved for strict-mode callers. Sanitization never produces it.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("Unexpected row shape: {0}")]
    RowShape(String),

    #[error("Unknown entity kind: {0}")]
    UnknownEntity(String),

    #[error("Invalid target configuration: {0}")]
    InvalidTarget(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Whether the failure came from the store and a retry might succeed.
    ///
    /// Nothing in this crate retries; the flag is for callers that want to.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Store(_))
    }

    /// Message safe to surface to an end user. Store details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            Error::Store(_) | Error::RowShape(_) | Error::Other(_) => {
                tracing::error!("Search failed: {}", self);
                "Search is temporarily unavailable".to_string()
            }
            _ => self.to_string(),
        }
    }
}
