use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Failure reported by a generation backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("generation timed out")]
    Timeout,

    #[error("rate limited by generation backend")]
    RateLimited,

    #[error("invalid generation request: {0}")]
    InvalidRequest(String),

    #[error("generation backend error: {0}")]
    Unknown(String),
}

impl GenerationError {
    /// Whether repeating the same request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout | Self::RateLimited)
    }
}

/// Rejected user or topic input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct ValidationError {
    pub reason: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("Invalid turn: {0}")]
    InvalidTurn(String),
}

impl EngineError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(ValidationError::new(reason))
    }
}
