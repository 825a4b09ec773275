use std::cmp::Reverse;

use tracing::{debug, warn};

use crate::errors::EngineError;
use crate::models::{IndicatorSet, MarketSnapshot, ScoreResult, ScreeningOutcome, TickerFailure};
use crate::services::scoring;

pub const DEFAULT_MIN_BUY_SCORE: u8 = 3;

/// A candidate whose data was fetched upstream: either a usable snapshot and
/// indicator pair, or the per-ticker failure that prevented one.
pub type Candidate = (String, Result<(MarketSnapshot, IndicatorSet), EngineError>);

/// Scores a candidate universe and ranks the survivors.
///
/// Candidates below `min_score` are dropped; candidates whose upstream fetch
/// failed are reported in `failures`, never mixed into the ranking. Output is
/// deterministic: descending score, ties broken by ticker ascending.
pub fn screen(candidates: Vec<Candidate>, min_score: u8) -> ScreeningOutcome {
    let mut ranked: Vec<(String, ScoreResult)> = Vec::new();
    let mut failures: Vec<TickerFailure> = Vec::new();

    for (ticker, outcome) in candidates {
        match outcome {
            Ok((snapshot, indicators)) => {
                let result = scoring::score_buy(&snapshot, &indicators);
                if result.score >= min_score {
                    ranked.push((ticker, result));
                } else {
                    debug!(%ticker, score = result.score, "below screening threshold");
                }
            }
            Err(err) => {
                warn!(%ticker, %err, "excluding candidate with failed data fetch");
                failures.push(TickerFailure::new(&ticker, &err));
            }
        }
    }

    ranked.sort_by(|a, b| {
        (Reverse(a.1.score), &a.0).cmp(&(Reverse(b.1.score), &b.0))
    });

    ScreeningOutcome { ranked, failures }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnalystRecommendation;

    fn candidate(ticker: &str, pe: f64, return_3m: f64) -> Candidate {
        let snapshot = MarketSnapshot {
            company_name: format!("{ticker} Inc"),
            sector: "Technology".into(),
            industry: "Software".into(),
            current_price: 100.0,
            fifty_two_week_high: 120.0,
            fifty_two_week_low: 80.0,
            pe_ratio: Some(pe),
            forward_pe: None,
            peg_ratio: None,
            price_to_book: None,
            dividend_yield: None,
            recommendation: AnalystRecommendation::Buy,
            target_price: None,
        };
        let indicators = IndicatorSet {
            return_3m: Some(return_3m),
            ..IndicatorSet::default()
        };
        (ticker.to_string(), Ok((snapshot, indicators)))
    }

    #[test]
    fn ranks_descending_with_ticker_tiebreak() {
        let candidates = vec![
            candidate("ZZZ", 15.0, 12.0), // 2 + 1 + 2 = 5
            candidate("BBB", 15.0, 0.0),  // 2 + 2 = 4
            candidate("AAA", 15.0, 0.0),  // 2 + 2 = 4
        ];

        let outcome = screen(candidates, DEFAULT_MIN_BUY_SCORE);
        let order: Vec<&str> = outcome.ranked.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(order, vec!["ZZZ", "AAA", "BBB"]);
    }

    #[test]
    fn drops_low_scores_but_reports_failures_separately() {
        let mut candidates = vec![candidate("GOOD", 15.0, 12.0)];
        // Scores 0: no rule fires
        let (_, ok) = candidate("DULL", 35.0, 0.0);
        let dull_snapshot = match ok {
            Ok((mut s, i)) => {
                s.recommendation = AnalystRecommendation::Unknown;
                (s, i)
            }
            Err(_) => unreachable!(),
        };
        candidates.push(("DULL".to_string(), Ok(dull_snapshot)));
        candidates.push((
            "GONE".to_string(),
            Err(EngineError::NotFound("GONE".to_string())),
        ));

        let outcome = screen(candidates, DEFAULT_MIN_BUY_SCORE);

        assert_eq!(outcome.ranked.len(), 1);
        assert_eq!(outcome.ranked[0].0, "GOOD");
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].ticker, "GONE");
        assert!(!outcome.failures[0].retryable);
        // the low scorer is neither ranked nor a failure
        assert!(!outcome.failures.iter().any(|f| f.ticker == "DULL"));
    }

    #[test]
    fn rerunning_is_deterministic() {
        let build = || {
            vec![
                candidate("MMM", 15.0, 12.0),
                candidate("AAA", 15.0, 12.0),
                candidate("KKK", 15.0, 0.0),
            ]
        };
        let first = screen(build(), 0);
        let second = screen(build(), 0);
        assert_eq!(first, second);
    }
}
