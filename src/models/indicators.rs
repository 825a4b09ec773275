use serde::{Deserialize, Serialize};

/// Moving-average crossover state over the two most recent sessions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CrossSignal {
    None,
    Golden,
    Death,
}

impl Default for CrossSignal {
    fn default() -> Self {
        Self::None
    }
}

/// Derived technical indicators for one ticker. Every field whose window
/// exceeds the available history is `None` rather than an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IndicatorSet {
    pub ma50: Option<f64>,
    pub ma200: Option<f64>,
    pub cross: CrossSignal,
    /// Percent change over the trailing ~21 sessions.
    pub return_1m: Option<f64>,
    /// Percent change over the trailing ~63 sessions.
    pub return_3m: Option<f64>,
    /// Sample std-dev of daily returns scaled by sqrt(252), in percent.
    pub volatility_annualized: Option<f64>,
}
