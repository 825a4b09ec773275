use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::EngineError;
use crate::models::{
    Holding, HoldingValuation, IndicatorSet, MarketSnapshot, PortfolioReport, PositionReport,
    SellRecommendation, TickerFailure,
};
use crate::services::scoring;

/// Market data gathered for the portfolio's tickers: per ticker either a
/// usable snapshot/indicator pair or the failure that prevented one.
pub type MarketData = BTreeMap<String, Result<(MarketSnapshot, IndicatorSet), EngineError>>;

// An explicit portfolio instance. There is no process-wide portfolio: callers
// create as many as they need, and writers are serialized by ownership
// (&mut self) rather than an internal lock.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Portfolio {
    holdings: BTreeMap<String, Holding>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds shares of a ticker, merging into an existing holding with a
    /// cost-weighted average purchase price. Rejects bad input before any
    /// state changes.
    pub fn add_or_update(
        &mut self,
        ticker: &str,
        shares: f64,
        purchase_price: f64,
    ) -> Result<&Holding, EngineError> {
        let ticker = normalize_ticker(ticker)?;

        if !(shares.is_finite() && shares > 0.0) {
            return Err(EngineError::InvalidInput(format!(
                "shares must be positive, got {shares}"
            )));
        }
        if !(purchase_price.is_finite() && purchase_price > 0.0) {
            return Err(EngineError::InvalidInput(format!(
                "purchase price must be positive, got {purchase_price}"
            )));
        }

        let holding = self
            .holdings
            .entry(ticker.clone())
            .and_modify(|h| {
                let total_shares = h.shares + shares;
                h.purchase_price =
                    (h.shares * h.purchase_price + shares * purchase_price) / total_shares;
                h.shares = total_shares;
            })
            .or_insert(Holding {
                ticker,
                shares,
                purchase_price,
            });

        Ok(holding)
    }

    pub fn remove(&mut self, ticker: &str) -> Option<Holding> {
        self.holdings.remove(&ticker.to_uppercase())
    }

    pub fn get(&self, ticker: &str) -> Option<&Holding> {
        self.holdings.get(&ticker.to_uppercase())
    }

    pub fn holdings(&self) -> impl Iterator<Item = &Holding> {
        self.holdings.values()
    }

    pub fn tickers(&self) -> Vec<String> {
        self.holdings.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    /// Values one holding at the given market price.
    pub fn valuation(
        &self,
        ticker: &str,
        current_price: f64,
    ) -> Result<HoldingValuation, EngineError> {
        let holding = self
            .get(ticker)
            .ok_or_else(|| EngineError::NotFound(ticker.to_uppercase()))?;
        Ok(value_holding(holding, current_price))
    }

    /// Assembles the aggregate report from pre-fetched market data.
    ///
    /// Holdings with failed fetches are excluded from the totals and listed
    /// in `failures`; one bad ticker never poisons the rest. Sell
    /// recommendations carry only tiers at `Sell` or above, ordered by
    /// descending score with ticker-ascending tie-break.
    pub fn build_report(&self, market: &MarketData) -> PortfolioReport {
        let mut positions = Vec::new();
        let mut recommendations = Vec::new();
        let mut failures = Vec::new();
        let mut total_cost = 0.0;
        let mut total_value = 0.0;

        for (ticker, holding) in &self.holdings {
            match market.get(ticker) {
                Some(Ok((snapshot, indicators))) => {
                    let valuation = value_holding(holding, snapshot.current_price);
                    total_cost += holding.cost_basis();
                    total_value += valuation.current_value;

                    positions.push(PositionReport {
                        ticker: ticker.clone(),
                        company_name: snapshot.company_name.clone(),
                        shares: holding.shares,
                        purchase_price: holding.purchase_price,
                        current_price: snapshot.current_price,
                        valuation,
                    });

                    let result = scoring::score_sell(holding, snapshot, indicators);
                    if result.tier.is_actionable_sell() {
                        recommendations.push(SellRecommendation {
                            ticker: ticker.clone(),
                            result,
                        });
                    }
                }
                Some(Err(err)) => {
                    warn!(%ticker, %err, "holding excluded from report totals");
                    failures.push(TickerFailure::new(ticker, err));
                }
                None => {
                    let err = EngineError::Transient(format!("no market data supplied for {ticker}"));
                    failures.push(TickerFailure::new(ticker, &err));
                }
            }
        }

        recommendations.sort_by(|a, b| {
            b.result
                .score
                .cmp(&a.result.score)
                .then_with(|| a.ticker.cmp(&b.ticker))
        });

        let pl_absolute = total_value - total_cost;
        let pl_percent = (total_cost != 0.0).then(|| pl_absolute / total_cost * 100.0);

        PortfolioReport {
            holdings_count: self.holdings.len(),
            total_cost,
            total_value,
            pl_absolute,
            pl_percent,
            positions,
            sell_recommendations: recommendations,
            failures,
            generated_at: Utc::now(),
        }
    }
}

fn normalize_ticker(ticker: &str) -> Result<String, EngineError> {
    let trimmed = ticker.trim();
    let valid = !trimmed.is_empty()
        && trimmed.len() <= 12
        && trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    if !valid {
        return Err(EngineError::InvalidInput(format!(
            "malformed ticker: {ticker:?}"
        )));
    }
    Ok(trimmed.to_uppercase())
}

fn value_holding(holding: &Holding, current_price: f64) -> HoldingValuation {
    let cost = holding.cost_basis();
    let current_value = holding.shares * current_price;
    let pl_absolute = current_value - cost;
    // N/A rather than a division error on a zero cost basis
    let pl_percent = (cost != 0.0).then(|| pl_absolute / cost * 100.0);

    HoldingValuation {
        current_value,
        pl_absolute,
        pl_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnalystRecommendation;

    fn snapshot(ticker: &str, current_price: f64) -> MarketSnapshot {
        MarketSnapshot {
            company_name: format!("{ticker} Inc"),
            sector: "Technology".into(),
            industry: "Software".into(),
            current_price,
            fifty_two_week_high: current_price * 1.2,
            fifty_two_week_low: current_price * 0.8,
            pe_ratio: None,
            forward_pe: None,
            peg_ratio: None,
            price_to_book: None,
            dividend_yield: None,
            recommendation: AnalystRecommendation::Unknown,
            target_price: None,
        }
    }

    #[test]
    fn repeated_adds_average_the_cost_basis() {
        let mut portfolio = Portfolio::new();
        portfolio.add_or_update("aapl", 5.0, 100.0).unwrap();
        portfolio.add_or_update("AAPL", 5.0, 200.0).unwrap();

        let holding = portfolio.get("AAPL").unwrap();
        assert_eq!(holding.shares, 10.0);
        assert_eq!(holding.purchase_price, 150.0);
        assert_eq!(portfolio.len(), 1, "ticker is a unique key");
    }

    #[test]
    fn invalid_input_leaves_state_untouched() {
        let mut portfolio = Portfolio::new();
        portfolio.add_or_update("MSFT", 2.0, 300.0).unwrap();

        assert!(matches!(
            portfolio.add_or_update("MSFT", -1.0, 300.0),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(matches!(
            portfolio.add_or_update("MSFT", 1.0, 0.0),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(matches!(
            portfolio.add_or_update("not a ticker!", 1.0, 10.0),
            Err(EngineError::InvalidInput(_))
        ));

        let holding = portfolio.get("MSFT").unwrap();
        assert_eq!(holding.shares, 2.0);
        assert_eq!(holding.purchase_price, 300.0);
        assert_eq!(portfolio.len(), 1);
    }

    #[test]
    fn valuation_matches_hand_computed_pnl() {
        let mut portfolio = Portfolio::new();
        portfolio.add_or_update("AAPL", 10.0, 150.0).unwrap();

        let v = portfolio.valuation("AAPL", 175.50).unwrap();
        assert!((v.current_value - 1755.00).abs() < 1e-9);
        assert!((v.pl_absolute - 255.00).abs() < 1e-9);
        assert!((v.pl_percent.unwrap() - 17.00).abs() < 1e-9);
    }

    #[test]
    fn valuation_of_unknown_ticker_is_not_found() {
        let portfolio = Portfolio::new();
        assert!(matches!(
            portfolio.valuation("NOPE", 10.0),
            Err(EngineError::NotFound(_))
        ));
    }

    #[test]
    fn remove_deletes_the_position() {
        let mut portfolio = Portfolio::new();
        portfolio.add_or_update("TSLA", 3.0, 200.0).unwrap();
        assert!(portfolio.remove("tsla").is_some());
        assert!(portfolio.is_empty());
    }

    #[test]
    fn report_totals_and_failure_isolation() {
        let mut portfolio = Portfolio::new();
        portfolio.add_or_update("AAPL", 10.0, 150.0).unwrap();
        portfolio.add_or_update("GONE", 5.0, 50.0).unwrap();

        let mut market: MarketData = BTreeMap::new();
        market.insert(
            "AAPL".into(),
            Ok((snapshot("AAPL", 175.50), IndicatorSet::default())),
        );
        market.insert("GONE".into(), Err(EngineError::NotFound("GONE".into())));

        let report = portfolio.build_report(&market);

        assert_eq!(report.holdings_count, 2);
        assert_eq!(report.positions.len(), 1, "failed ticker is excluded");
        assert!((report.total_cost - 1500.0).abs() < 1e-9);
        assert!((report.total_value - 1755.0).abs() < 1e-9);
        assert!((report.pl_percent.unwrap() - 17.0).abs() < 1e-9);

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].ticker, "GONE");
        assert!(!report.failures[0].retryable);
    }

    #[test]
    fn report_lists_only_actionable_sells_in_rank_order() {
        let mut portfolio = Portfolio::new();
        portfolio.add_or_update("DOWNA", 10.0, 100.0).unwrap();
        portfolio.add_or_update("DOWNB", 10.0, 100.0).unwrap();
        portfolio.add_or_update("FLAT", 10.0, 100.0).unwrap();

        let mut market: MarketData = BTreeMap::new();
        // both big losers score 3 (Sell); FLAT scores 0 (Hold)
        market.insert(
            "DOWNA".into(),
            Ok((snapshot("DOWNA", 70.0), IndicatorSet::default())),
        );
        market.insert(
            "DOWNB".into(),
            Ok((snapshot("DOWNB", 70.0), IndicatorSet::default())),
        );
        market.insert(
            "FLAT".into(),
            Ok((snapshot("FLAT", 101.0), IndicatorSet::default())),
        );

        let report = portfolio.build_report(&market);

        let tickers: Vec<&str> = report
            .sell_recommendations
            .iter()
            .map(|r| r.ticker.as_str())
            .collect();
        assert_eq!(tickers, vec!["DOWNA", "DOWNB"], "tie broken by ticker");
        assert!(report
            .sell_recommendations
            .iter()
            .all(|r| r.result.tier.is_actionable_sell()));
    }

    #[test]
    fn empty_portfolio_report_has_na_percent() {
        let report = Portfolio::new().build_report(&BTreeMap::new());
        assert_eq!(report.total_cost, 0.0);
        assert_eq!(report.pl_percent, None);
        assert!(report.sell_recommendations.is_empty());
    }
}
