mod holding;
mod indicators;
mod price_point;
mod scoring;
mod snapshot;

pub use holding::{Holding, HoldingValuation};
pub use indicators::{CrossSignal, IndicatorSet};
pub use price_point::PricePoint;
pub use scoring::{
    PortfolioReport, PositionReport, ScoreResult, ScreeningOutcome, SellRecommendation, Tier,
    TickerFailure,
};
pub use snapshot::{AnalystRecommendation, Fundamentals, MarketSnapshot};
