use serde::{Deserialize, Serialize};

/// Analyst consensus vocabulary. Anything the provider sends outside this set
/// collapses to `Unknown`, which triggers no scoring rule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnalystRecommendation {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
    Unknown,
}

impl AnalystRecommendation {
    /// Lenient parse of provider strings like "strongBuy", "STRONG_SELL".
    pub fn from_provider(raw: &str) -> Self {
        let key: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "strongbuy" => Self::StrongBuy,
            "buy" | "overweight" | "outperform" => Self::Buy,
            "hold" | "neutral" => Self::Hold,
            "sell" | "underweight" | "underperform" => Self::Sell,
            "strongsell" => Self::StrongSell,
            _ => Self::Unknown,
        }
    }

    pub fn is_negative(&self) -> bool {
        matches!(self, Self::Sell | Self::StrongSell)
    }

    pub fn is_positive(&self) -> bool {
        matches!(self, Self::Buy | Self::StrongBuy)
    }
}

impl Default for AnalystRecommendation {
    fn default() -> Self {
        Self::Unknown
    }
}

// Point-in-time state for one ticker as supplied by the market data provider.
// Read-only input; the engine never mutates a snapshot. Valuation fields use
// `Option<f64>` because a missing ratio means "rule not applicable", never 0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketSnapshot {
    pub company_name: String,
    pub sector: String,
    pub industry: String,

    pub current_price: f64,
    pub fifty_two_week_high: f64,
    pub fifty_two_week_low: f64,

    pub pe_ratio: Option<f64>,
    pub forward_pe: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub price_to_book: Option<f64>,
    /// Percent, e.g. 2.5 for a 2.5% yield.
    pub dividend_yield: Option<f64>,

    #[serde(default)]
    pub recommendation: AnalystRecommendation,
    pub target_price: Option<f64>,
}

/// Valuation ratios after sentinel scrubbing. Produced by the valuation
/// normalizer; `None` always means "unknown", never zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Fundamentals {
    pub pe_ratio: Option<f64>,
    pub forward_pe: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub price_to_book: Option<f64>,
    pub dividend_yield: Option<f64>,
}
