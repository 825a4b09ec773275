use serde::{Deserialize, Serialize};

// One tracked position. Repeated additions of the same ticker are merged by
// the portfolio aggregator using a cost-weighted average purchase price.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Holding {
    pub ticker: String,
    pub shares: f64,
    pub purchase_price: f64,
}

impl Holding {
    pub fn cost_basis(&self) -> f64 {
        self.shares * self.purchase_price
    }
}

/// Point-in-time valuation of a holding at a given market price.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HoldingValuation {
    pub current_value: f64,
    pub pl_absolute: f64,
    /// `None` when the cost basis is zero (percent P&L is N/A, not an error).
    pub pl_percent: Option<f64>,
}
