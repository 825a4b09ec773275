use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::errors::EngineError;

#[derive(Debug, Clone)]
pub struct FailureInfo {
    pub failed_at: DateTime<Utc>,
    pub error: EngineError,
    pub ttl_hours: i64,
}

/// Thread-safe memory of recent per-ticker fetch failures.
///
/// A NotFound ticker (delisted, typo) is terminal and remembered for a day
/// so batch runs stop hammering the provider for it; transient failures are
/// remembered briefly so a single rate-limit hiccup does not blacklist a
/// ticker.
#[derive(Clone, Default)]
pub struct FailureCache {
    cache: Arc<DashMap<String, FailureInfo>>,
}

impl FailureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the remembered failure if one is still within its TTL.
    pub fn check(&self, ticker: &str) -> Option<EngineError> {
        if let Some(entry) = self.cache.get(ticker) {
            let info = entry.value().clone();
            let expiry = info.failed_at + Duration::hours(info.ttl_hours);

            if Utc::now() < expiry {
                return Some(info.error);
            }
            drop(entry); // release the read lock before removing
            self.cache.remove(ticker);
        }
        None
    }

    pub fn record(&self, ticker: &str, error: &EngineError) {
        let ttl_hours = match error {
            EngineError::NotFound(_) => 24,
            EngineError::Transient(_) => 1,
            // input errors are caller bugs, not provider state; don't cache
            EngineError::InvalidInput(_) => return,
        };

        self.cache.insert(
            ticker.to_string(),
            FailureInfo {
                failed_at: Utc::now(),
                error: error.clone(),
                ttl_hours,
            },
        );
    }

    /// Forget a ticker, e.g. after a successful fetch.
    pub fn clear(&self, ticker: &str) {
        self.cache.remove(ticker);
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
