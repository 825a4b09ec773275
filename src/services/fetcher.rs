use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::errors::EngineError;
use crate::external::market_provider::MarketDataProvider;
use crate::external::rate_limit::RateLimiter;
use crate::models::{IndicatorSet, MarketSnapshot};
use crate::services::failure_cache::FailureCache;
use crate::services::indicators;

pub const DEFAULT_LOOKBACK_DAYS: u32 = 365;

/// Gathers snapshot + history per ticker with bounded concurrency and turns
/// the history into indicators. One ticker's failure never aborts the batch:
/// the result carries a per-ticker `Result`.
pub struct Fetcher {
    provider: Arc<dyn MarketDataProvider>,
    limiter: Arc<RateLimiter>,
    failures: FailureCache,
    lookback_days: u32,
}

impl Fetcher {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        limiter: Arc<RateLimiter>,
        lookback_days: u32,
    ) -> Self {
        Self {
            provider,
            limiter,
            failures: FailureCache::new(),
            lookback_days,
        }
    }

    /// Fetches one ticker's snapshot and derived indicators. Known-bad
    /// tickers short-circuit from the failure cache without touching the
    /// provider.
    pub async fn fetch_one(
        &self,
        ticker: &str,
    ) -> Result<(MarketSnapshot, IndicatorSet), EngineError> {
        if let Some(err) = self.failures.check(ticker) {
            debug!(%ticker, "short-circuiting known-bad ticker");
            return Err(err);
        }

        let result = self.fetch_inner(ticker).await;

        match &result {
            Ok(_) => self.failures.clear(ticker),
            Err(err) => {
                warn!(%ticker, %err, "ticker fetch failed");
                self.failures.record(ticker, err);
            }
        }

        result
    }

    async fn fetch_inner(
        &self,
        ticker: &str,
    ) -> Result<(MarketSnapshot, IndicatorSet), EngineError> {
        let snapshot = {
            let _guard = self.limiter.acquire().await;
            self.provider
                .fetch_snapshot(ticker)
                .await
                .map_err(|e| EngineError::from_provider(ticker, e))?
        };

        let history = {
            let _guard = self.limiter.acquire().await;
            self.provider
                .fetch_history(ticker, self.lookback_days)
                .await
                .map_err(|e| EngineError::from_provider(ticker, e))?
        };

        Ok((snapshot, indicators::compute_indicators(&history)))
    }

    /// Fan-out over a ticker universe. The rate limiter bounds how many
    /// provider calls are actually in flight. Results come back sorted by
    /// ticker for deterministic downstream processing.
    pub async fn fetch_universe(
        &self,
        tickers: &[String],
    ) -> Vec<(String, Result<(MarketSnapshot, IndicatorSet), EngineError>)> {
        let futures = tickers.iter().map(|ticker| async move {
            (ticker.clone(), self.fetch_one(ticker).await)
        });

        let mut results = join_all(futures).await;
        results.sort_by(|a, b| a.0.cmp(&b.0));
        results
    }
}
