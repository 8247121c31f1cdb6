use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required delivery credential is absent from the store.
    #[error("configuration missing: {0}")]
    ConfigMissing(String),

    /// The summarization service reported a rate/usage limit (retryable).
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    /// The requested model identifier could not be resolved by the service.
    #[error("model not found: {0}")]
    ModelUnresolvable(String),

    /// Any other service-reported failure (terminal, never retried).
    #[error("service error: {0}")]
    Service(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl AppError {
    /// Retryable failures are exactly the quota-classed ones.
    pub fn is_quota(&self) -> bool {
        matches!(self, AppError::QuotaExceeded(_))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
