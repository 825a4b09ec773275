use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::EngineError;
use crate::models::HoldingValuation;

/// Ordinal recommendation bucket derived from a 0-10 score.
///
/// Sell and buy scoring share one threshold table (0 / 1-2 / 3-4 / 5-10);
/// only the labels of the two upper buckets differ by direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Hold,
    Monitor,
    Sell,
    StrongSell,
    Buy,
    StrongBuy,
}

impl Tier {
    pub fn for_sell(score: u8) -> Self {
        match score {
            0 => Tier::Hold,
            1..=2 => Tier::Monitor,
            3..=4 => Tier::Sell,
            _ => Tier::StrongSell,
        }
    }

    pub fn for_buy(score: u8) -> Self {
        match score {
            0 => Tier::Hold,
            1..=2 => Tier::Monitor,
            3..=4 => Tier::Buy,
            _ => Tier::StrongBuy,
        }
    }

    /// True for `Sell` and `StrongSell`; these are the tiers that make a
    /// holding appear in the portfolio report's recommendation list.
    pub fn is_actionable_sell(&self) -> bool {
        matches!(self, Tier::Sell | Tier::StrongSell)
    }
}

/// Output of scoring one ticker for sell or buy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreResult {
    /// Clamped to [0, 10].
    pub score: u8,
    pub tier: Tier,
    /// One entry per triggered rule, in rule-table order. Empty when no
    /// signal fired.
    pub reasons: Vec<String>,
}

/// A per-ticker fetch failure surfaced alongside partial results. Never
/// conflated with a legitimate low score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TickerFailure {
    pub ticker: String,
    pub error: String,
    pub retryable: bool,
}

impl TickerFailure {
    pub fn new(ticker: &str, err: &EngineError) -> Self {
        Self {
            ticker: ticker.to_string(),
            error: err.to_string(),
            retryable: err.is_retryable(),
        }
    }
}

/// Ranked output of screening a candidate universe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScreeningOutcome {
    /// Descending by score, ties broken by ticker ascending.
    pub ranked: Vec<(String, ScoreResult)>,
    pub failures: Vec<TickerFailure>,
}

/// One holding's line in the portfolio report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PositionReport {
    pub ticker: String,
    pub company_name: String,
    pub shares: f64,
    pub purchase_price: f64,
    pub current_price: f64,
    pub valuation: HoldingValuation,
}

/// A holding whose sell tier reached `Sell` or above.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SellRecommendation {
    pub ticker: String,
    pub result: ScoreResult,
}

/// Aggregate portfolio view assembled by the portfolio aggregator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortfolioReport {
    pub holdings_count: usize,
    pub total_cost: f64,
    pub total_value: f64,
    pub pl_absolute: f64,
    /// `None` when total cost is zero.
    pub pl_percent: Option<f64>,
    pub positions: Vec<PositionReport>,
    /// Sorted descending by score, ties broken by ticker ascending.
    pub sell_recommendations: Vec<SellRecommendation>,
    pub failures: Vec<TickerFailure>,
    pub generated_at: DateTime<Utc>,
}
