use crate::models::{CrossSignal, IndicatorSet, PricePoint};

const MA_SHORT: usize = 50;
const MA_LONG: usize = 200;
const SESSIONS_1M: usize = 21;
const SESSIONS_3M: usize = 63;
const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Simple Moving Average (SMA)
/// Returns a vector aligned with `values`:
/// - `None` until enough values exist
/// - `Some(avg)` after `window` values
pub fn sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    // Running sum via scan, subtracting the value that falls out of the window.
    values
        .iter()
        .enumerate()
        .scan(0.0_f64, move |sum, (i, &v)| {
            *sum += v;
            if i >= window {
                *sum -= values[i - window];
            }

            let out = if i + 1 >= window {
                Some(*sum / window as f64)
            } else {
                None
            };

            Some(out)
        })
        .collect()
}

/// Percent change over the trailing `sessions` sessions. `None` when the
/// series is too short or the reference price is zero.
fn trailing_return(closes: &[f64], sessions: usize) -> Option<f64> {
    if closes.len() <= sessions {
        return None;
    }
    let now = *closes.last()?;
    let past = closes[closes.len() - 1 - sessions];
    if past == 0.0 {
        return None;
    }
    Some((now - past) / past * 100.0)
}

/// Sample standard deviation of single-session returns scaled by sqrt(252),
/// in percent. `None` with fewer than two returns.
fn annualized_volatility(closes: &[f64]) -> Option<f64> {
    let returns: Vec<f64> = closes
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .collect();

    if returns.len() < 2 {
        return None;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);

    Some(variance.sqrt() * TRADING_DAYS_PER_YEAR.sqrt() * 100.0)
}

/// Compares the sign of `ma_short - ma_long` across the two most recent
/// sessions. Either average undefined at either session means no cross.
fn detect_cross(ma_short: &[Option<f64>], ma_long: &[Option<f64>]) -> CrossSignal {
    let n = ma_short.len();
    if n < 2 || ma_long.len() != n {
        return CrossSignal::None;
    }

    let (Some(s_now), Some(l_now), Some(s_prev), Some(l_prev)) =
        (ma_short[n - 1], ma_long[n - 1], ma_short[n - 2], ma_long[n - 2])
    else {
        return CrossSignal::None;
    };

    let prev = s_prev - l_prev;
    let now = s_now - l_now;

    if prev <= 0.0 && now > 0.0 {
        CrossSignal::Golden
    } else if prev >= 0.0 && now < 0.0 {
        CrossSignal::Death
    } else {
        CrossSignal::None
    }
}

/// Derives the full indicator set from a daily close series (ascending by
/// date). Never fails: any indicator whose window exceeds the available
/// history is simply `None`.
pub fn compute_indicators(series: &[PricePoint]) -> IndicatorSet {
    let closes: Vec<f64> = series.iter().map(|p| p.close).collect();

    let ma_short = sma(&closes, MA_SHORT);
    let ma_long = sma(&closes, MA_LONG);

    IndicatorSet {
        ma50: ma_short.last().copied().flatten(),
        ma200: ma_long.last().copied().flatten(),
        cross: detect_cross(&ma_short, &ma_long),
        return_1m: trailing_return(&closes, SESSIONS_1M),
        return_3m: trailing_return(&closes, SESSIONS_3M),
        volatility_annualized: annualized_volatility(&closes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(closes: &[f64]) -> Vec<PricePoint> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: start + chrono::Duration::days(i as i64),
                close,
            })
            .collect()
    }

    #[test]
    fn empty_series_yields_all_undefined() {
        let set = compute_indicators(&[]);
        assert_eq!(set, IndicatorSet::default());
    }

    #[test]
    fn short_series_leaves_windowed_indicators_undefined() {
        let set = compute_indicators(&series(&vec![100.0; 49]));
        assert!(set.ma50.is_none());
        assert!(set.ma200.is_none());
        assert_eq!(set.cross, CrossSignal::None);

        let set = compute_indicators(&series(&vec![100.0; 60]));
        assert!(set.ma50.is_some());
        assert!(set.ma200.is_none(), "199 or fewer sessions has no 200d MA");
        assert_eq!(set.cross, CrossSignal::None, "cross needs both averages");
    }

    #[test]
    fn sma_matches_hand_computed_values() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let avg = sma(&values, 3);
        assert_eq!(avg, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn golden_cross_on_sign_change_upward() {
        // short MA moves from below-or-equal to above the long MA
        let short = vec![Some(9.0), Some(11.0)];
        let long = vec![Some(10.0), Some(10.0)];
        assert_eq!(detect_cross(&short, &long), CrossSignal::Golden);

        // from exactly equal counts as a cross too
        let short = vec![Some(10.0), Some(11.0)];
        assert_eq!(detect_cross(&short, &long), CrossSignal::Golden);
    }

    #[test]
    fn death_cross_on_sign_change_downward() {
        let short = vec![Some(11.0), Some(9.0)];
        let long = vec![Some(10.0), Some(10.0)];
        assert_eq!(detect_cross(&short, &long), CrossSignal::Death);
    }

    #[test]
    fn no_cross_without_sign_change_or_with_undefined_average() {
        let short = vec![Some(11.0), Some(12.0)];
        let long = vec![Some(10.0), Some(10.0)];
        assert_eq!(detect_cross(&short, &long), CrossSignal::None);

        let short = vec![None, Some(12.0)];
        assert_eq!(detect_cross(&short, &long), CrossSignal::None);
    }

    #[test]
    fn full_length_series_defines_both_averages() {
        let set = compute_indicators(&series(&vec![50.0; 250]));
        assert_eq!(set.ma50, Some(50.0));
        assert_eq!(set.ma200, Some(50.0));
        assert_eq!(set.cross, CrossSignal::None);
    }

    #[test]
    fn trailing_returns_use_n_sessions_ago() {
        // 22 closes: first is 100, last is 110 -> 1m return compares against
        // the close 21 sessions back
        let mut closes = vec![100.0];
        closes.extend(std::iter::repeat(105.0).take(20));
        closes.push(110.0);
        let set = compute_indicators(&series(&closes));
        let r = set.return_1m.unwrap();
        assert!((r - 10.0).abs() < 1e-9);
        assert!(set.return_3m.is_none(), "needs 64 sessions");
    }

    #[test]
    fn volatility_zero_for_constant_prices_and_undefined_when_short() {
        let set = compute_indicators(&series(&[100.0, 100.0, 100.0, 100.0]));
        assert_eq!(set.volatility_annualized, Some(0.0));

        let set = compute_indicators(&series(&[100.0, 101.0]));
        assert!(
            set.volatility_annualized.is_none(),
            "one return is not enough for a sample std-dev"
        );
    }

    #[test]
    fn volatility_scales_with_dispersion() {
        let calm = compute_indicators(&series(&[100.0, 100.5, 100.0, 100.5, 100.0]));
        let wild = compute_indicators(&series(&[100.0, 110.0, 95.0, 112.0, 90.0]));
        assert!(
            wild.volatility_annualized.unwrap() > calm.volatility_annualized.unwrap()
        );
    }
}
