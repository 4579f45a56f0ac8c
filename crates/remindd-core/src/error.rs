//! Unified error types for remindd.

use thiserror::Error;

/// Result type alias using RemindError.
pub type Result<T> = std::result::Result<T, RemindError>;

#[derive(Error, Debug)]
pub enum RemindError {
    // Store errors
    #[error("Store error: {0}")]
    Store(String),

    /// The dedup column is absent from the subscriber table. Kept distinct
    /// from every other store error so callers can degrade instead of abort.
    #[error("Store column missing: {0}")]
    MissingColumn(String),

    // Channel errors
    #[error("Channel error: {0}")]
    Channel(String),

    #[error("Push credentials error: {0}")]
    Credentials(String),

    #[error("Provider HTTP error: {0}")]
    Http(String),

    /// Provider accepted the request but reported a per-ticket failure.
    #[error("Provider ticket error: {0}")]
    Ticket(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl RemindError {
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn channel(msg: impl Into<String>) -> Self {
        Self::Channel(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True when the underlying store rejected a column that is not in its
    /// schema — the trigger for the dedup graceful-degradation path.
    pub fn is_missing_column(&self) -> bool {
        matches!(self, Self::MissingColumn(_))
    }
}
