use async_trait::async_trait;
use thiserror::Error;

use crate::models::{MarketSnapshot, PricePoint};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderError {
    #[error("ticker not found")]
    NotFound,

    #[error("rate limited")]
    RateLimited,

    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Boundary to the external market data source. Implementations own all
/// network concerns (timeouts, auth); the engine only consumes the contract.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch_snapshot(&self, ticker: &str) -> Result<MarketSnapshot, ProviderError>;

    /// Daily closes over roughly `lookback_days` calendar days, ascending by
    /// date. A shorter series than requested is a valid result.
    async fn fetch_history(
        &self,
        ticker: &str,
        lookback_days: u32,
    ) -> Result<Vec<PricePoint>, ProviderError>;
}
