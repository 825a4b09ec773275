use crate::models::{
    AnalystRecommendation, CrossSignal, Fundamentals, Holding, IndicatorSet, MarketSnapshot,
    ScoreResult, Tier,
};
use crate::services::valuation;

const MAX_SCORE: u32 = 10;

/// One scoring rule: a fixed point value and a predicate that yields the
/// human-readable reason when it fires. Rules are evaluated uniformly in
/// table order, so adding a rule is a table entry, not a new branch.
struct Rule<Ctx> {
    points: u8,
    check: fn(&Ctx) -> Option<String>,
}

fn evaluate<Ctx>(rules: &[Rule<Ctx>], ctx: &Ctx) -> (u8, Vec<String>) {
    let mut total: u32 = 0;
    let mut reasons = Vec::new();

    for rule in rules {
        if let Some(reason) = (rule.check)(ctx) {
            total += u32::from(rule.points);
            reasons.push(reason);
        }
    }

    (total.min(MAX_SCORE) as u8, reasons)
}

// ---------------------------------------------------------------------------
// Sell scoring
// ---------------------------------------------------------------------------

/// Owned inputs for the sell rule table. Unknown fundamentals and undefined
/// indicators stay `None` and trigger nothing.
struct SellContext {
    /// Unrealized P&L percent against the cost-weighted purchase price.
    pl_percent: f64,
    fundamentals: Fundamentals,
    cross: CrossSignal,
    return_1m: Option<f64>,
    volatility_annualized: Option<f64>,
    recommendation: AnalystRecommendation,
}

const SELL_RULES: &[Rule<SellContext>] = &[
    Rule {
        points: 3,
        check: |ctx| {
            (ctx.pl_percent <= -20.0)
                .then(|| format!("Large loss: position down {:.1}% from cost", -ctx.pl_percent))
        },
    },
    Rule {
        points: 2,
        check: |ctx| {
            (ctx.pl_percent >= 50.0).then(|| {
                format!(
                    "Large gain: position up {:.1}%, consider taking profits",
                    ctx.pl_percent
                )
            })
        },
    },
    Rule {
        points: 2,
        check: |ctx| {
            (ctx.cross == CrossSignal::Death)
                .then(|| "Death cross: 50-day average fell below the 200-day average".to_string())
        },
    },
    Rule {
        points: 1,
        check: |ctx| {
            ctx.fundamentals
                .pe_ratio
                .filter(|&pe| pe > 40.0)
                .map(|pe| format!("High P/E ratio: {pe:.1}"))
        },
    },
    Rule {
        points: 1,
        check: |ctx| {
            ctx.fundamentals
                .peg_ratio
                .filter(|&peg| peg > 2.0)
                .map(|peg| format!("High PEG ratio: {peg:.2}"))
        },
    },
    Rule {
        points: 2,
        check: |ctx| {
            ctx.return_1m
                .filter(|&r| r <= -15.0)
                .map(|r| format!("Sharp pullback: {r:.1}% over the last month"))
        },
    },
    Rule {
        points: 1,
        check: |ctx| {
            ctx.volatility_annualized
                .filter(|&v| v > 50.0)
                .map(|v| format!("High volatility: {v:.1}% annualized"))
        },
    },
    Rule {
        points: 2,
        check: |ctx| {
            ctx.recommendation
                .is_negative()
                .then(|| "Negative analyst consensus".to_string())
        },
    },
];

/// Scores a held position for sale. Deterministic: the same inputs always
/// produce the same score and the same reason order.
pub fn score_sell(
    holding: &Holding,
    snapshot: &MarketSnapshot,
    indicators: &IndicatorSet,
) -> ScoreResult {
    let pl_percent =
        (snapshot.current_price - holding.purchase_price) / holding.purchase_price * 100.0;

    let ctx = SellContext {
        pl_percent,
        fundamentals: valuation::normalize(snapshot),
        cross: indicators.cross,
        return_1m: indicators.return_1m,
        volatility_annualized: indicators.volatility_annualized,
        recommendation: snapshot.recommendation,
    };

    let (score, reasons) = evaluate(SELL_RULES, &ctx);

    ScoreResult {
        score,
        tier: Tier::for_sell(score),
        reasons,
    }
}

// ---------------------------------------------------------------------------
// Buy scoring
// ---------------------------------------------------------------------------

struct BuyContext {
    fundamentals: Fundamentals,
    current_price: f64,
    target_price: Option<f64>,
    return_3m: Option<f64>,
    recommendation: AnalystRecommendation,
}

const BUY_RULES: &[Rule<BuyContext>] = &[
    Rule {
        points: 2,
        check: |ctx| {
            ctx.fundamentals
                .pe_ratio
                .filter(|&pe| pe < 20.0)
                .map(|pe| format!("Attractive P/E ratio: {pe:.1}"))
        },
    },
    Rule {
        points: 2,
        check: |ctx| {
            ctx.fundamentals
                .peg_ratio
                .filter(|&peg| peg < 1.0)
                .map(|peg| format!("Attractive PEG ratio: {peg:.2}"))
        },
    },
    Rule {
        points: 1,
        check: |ctx| {
            ctx.return_3m
                .filter(|&r| r > 10.0)
                .map(|r| format!("Positive momentum: {r:+.1}% over three months"))
        },
    },
    Rule {
        points: 1,
        check: |ctx| {
            ctx.fundamentals
                .dividend_yield
                .filter(|&y| y > 2.0)
                .map(|y| format!("Dividend income: {y:.2}% yield"))
        },
    },
    Rule {
        points: 2,
        check: |ctx| {
            ctx.recommendation
                .is_positive()
                .then(|| "Positive analyst consensus".to_string())
        },
    },
    Rule {
        points: 2,
        check: |ctx| {
            let target = ctx.target_price?;
            if ctx.current_price <= 0.0 {
                return None;
            }
            let upside = (target - ctx.current_price) / ctx.current_price * 100.0;
            (upside > 15.0).then(|| format!("Upside to analyst target: {upside:.1}%"))
        },
    },
];

/// Scores a candidate for purchase. No position is required.
pub fn score_buy(snapshot: &MarketSnapshot, indicators: &IndicatorSet) -> ScoreResult {
    let ctx = BuyContext {
        fundamentals: valuation::normalize(snapshot),
        current_price: snapshot.current_price,
        target_price: snapshot.target_price,
        return_3m: indicators.return_3m,
        recommendation: snapshot.recommendation,
    };

    let (score, reasons) = evaluate(BUY_RULES, &ctx);

    ScoreResult {
        score,
        tier: Tier::for_buy(score),
        reasons,
    }
}
