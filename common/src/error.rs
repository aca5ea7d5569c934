use async_openai::error::OpenAIError;
use thiserror::Error;
use tokio::task::JoinError;

// Core internal errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] surrealdb::Error),
    #[error("OpenAI error: {0}")]
    OpenAI(#[from] OpenAIError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Processing error: {0}")]
    Processing(String),
    #[error("Timed out: {0}")]
    Timeout(String),
    #[error("IoError: {0}")]
    Io(#[from] std::io::Error),
    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("Readability error: {0}")]
    Readability(#[from] dom_smoothie::ReadabilityError),
    #[error("Task join error: {0}")]
    Join(#[from] JoinError),
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
    #[error("Internal service error: {0}")]
    Internal(String),
}

impl AppError {
    /// Store and embedding failures have no safe partial state to continue
    /// from, so they abort the enclosing ingest instead of being counted as
    /// a per-item failure. Embedding errors arrive wrapped in `Anyhow`;
    /// `Internal` marks broken invariants on the write path.
    pub fn is_fatal_for_ingest(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::OpenAI(_) | Self::Anyhow(_) | Self::Internal(_)
        )
    }
}
