use crate::models::{Fundamentals, MarketSnapshot};

/// Drops provider sentinels: non-finite values and negative values for ratios
/// that cannot meaningfully be negative. A scrubbed field is `None`, which no
/// scoring rule treats as an extreme value.
fn scrub(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v >= 0.0)
}

pub fn normalize(snapshot: &MarketSnapshot) -> Fundamentals {
    Fundamentals {
        pe_ratio: scrub(snapshot.pe_ratio),
        forward_pe: scrub(snapshot.forward_pe),
        peg_ratio: scrub(snapshot.peg_ratio),
        price_to_book: scrub(snapshot.price_to_book),
        dividend_yield: scrub(snapshot.dividend_yield),
    }
}
