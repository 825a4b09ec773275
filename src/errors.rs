use thiserror::Error;

use crate::external::market_provider::ProviderError;

/// Engine-level error taxonomy.
///
/// Insufficient price history is deliberately NOT an error: indicators that
/// lack their window come back as `None` and the rules depending on them
/// simply do not trigger.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    /// Unknown or delisted ticker. Terminal for that ticker; callers should
    /// not retry.
    #[error("ticker not found: {0}")]
    NotFound(String),

    /// Provider unavailable or rate limited. Retry policy belongs to the
    /// caller; the engine never retries on its own.
    #[error("transient provider error: {0}")]
    Transient(String),

    /// Rejected before any state mutation (bad shares/price/ticker).
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl EngineError {
    pub fn from_provider(ticker: &str, err: ProviderError) -> Self {
        match err {
            ProviderError::NotFound => EngineError::NotFound(ticker.to_string()),
            other => EngineError::Transient(other.to_string()),
        }
    }

    /// Whether the caller may reasonably retry the operation for this ticker.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Transient(_))
    }
}
